//! @ai:module:intent Statistical aggregation of extracted measurements
//! @ai:module:layer application
//! @ai:module:public_api MetricsAggregator, MetricsAggregatorTrait, GroupBy, summarize
//! @ai:module:stateless true

use crate::metrics::types::{
    AggregatedStat, CoreSample, Metric, MetricRecord, MetricSummary, RunAverage,
};
use std::collections::BTreeMap;

/// @ai:intent Second component of the grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    RunKind,
    RunIdentifier,
}

impl GroupBy {
    fn key(&self, record: &MetricRecord) -> String {
        match self {
            GroupBy::RunKind => record.run_kind.as_str().to_string(),
            GroupBy::RunIdentifier => record.run_identifier.clone(),
        }
    }
}

/// @ai:intent Trait for metrics aggregation
pub trait MetricsAggregatorTrait: Send + Sync {
    /// @ai:intent Summarize records per (benchmark, key)
    fn aggregate(&self, records: &[MetricRecord], group_by: GroupBy) -> Vec<AggregatedStat>;

    /// @ai:intent Average each (run, benchmark) pair across its cores
    fn average_per_run(&self, samples: &[CoreSample]) -> Vec<RunAverage>;
}

/// @ai:intent Aggregates metric records into statistical summaries
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// @ai:intent Create a new metrics aggregator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Summarize every metric present in a non-empty group
    /// @ai:effects pure
    fn aggregate_group(
        benchmark: String,
        grouping_key: String,
        group: &[&MetricRecord],
    ) -> AggregatedStat {
        let metrics = Metric::ALL
            .iter()
            .filter_map(|metric| {
                let values: Vec<f64> = group.iter().filter_map(|r| r.usage.value(*metric)).collect();
                summarize(&values).map(|summary| (*metric, summary))
            })
            .collect();

        AggregatedStat {
            benchmark,
            grouping_key,
            metrics,
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsAggregatorTrait for MetricsAggregator {
    /// @ai:intent Group by benchmark and key, then summarize each group
    /// @ai:effects pure
    /// @ai:post output ordered by (benchmark, key) regardless of input order
    fn aggregate(&self, records: &[MetricRecord], group_by: GroupBy) -> Vec<AggregatedStat> {
        let mut groups: BTreeMap<(String, String), Vec<&MetricRecord>> = BTreeMap::new();

        for record in records {
            groups
                .entry((record.benchmark.clone(), group_by.key(record)))
                .or_default()
                .push(record);
        }

        groups
            .into_iter()
            .map(|((benchmark, key), group)| Self::aggregate_group(benchmark, key, &group))
            .collect()
    }

    /// @ai:intent Mean elapsed time and mean non-null memory per (run, benchmark)
    /// @ai:effects pure
    /// @ai:edge_cases memory stays None when no core reported it
    fn average_per_run(&self, samples: &[CoreSample]) -> Vec<RunAverage> {
        let mut groups: BTreeMap<(&str, &str), Vec<&CoreSample>> = BTreeMap::new();

        for sample in samples {
            groups
                .entry((sample.run_id.as_str(), sample.benchmark.as_str()))
                .or_default()
                .push(sample);
        }

        groups
            .into_iter()
            .map(|((run_id, benchmark), group)| {
                let elapsed: Vec<f64> = group.iter().map(|s| s.elapsed_seconds).collect();
                let memory: Vec<f64> = group.iter().filter_map(|s| s.max_memory_mb).collect();

                RunAverage {
                    run_id: run_id.to_string(),
                    benchmark: benchmark.to_string(),
                    elapsed_seconds: mean(&elapsed).unwrap_or(0.0),
                    max_memory_mb: mean(&memory),
                }
            })
            .collect()
    }
}

/// @ai:intent Mean, sample std, min, max and count of a series
/// @ai:effects pure
/// @ai:post None for an empty series; std is NaN for a single value
pub fn summarize(values: &[f64]) -> Option<MetricSummary> {
    let mean = mean(values)?;
    let count = values.len();

    let std = if count < 2 {
        f64::NAN
    } else {
        let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_sq / (count - 1) as f64).sqrt()
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(MetricSummary {
        mean,
        std,
        min,
        max,
        count,
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::types::{ResourceUsage, RunKind};

    fn record(benchmark: &str, run: &str, kind: RunKind, elapsed: f64, memory_mb: f64) -> MetricRecord {
        MetricRecord {
            timestamp_id: "20250101-000000".to_string(),
            benchmark: benchmark.to_string(),
            run_identifier: run.to_string(),
            core_id: 0,
            run_kind: kind,
            usage: ResourceUsage {
                elapsed_seconds: elapsed,
                max_memory_mb: memory_mb,
                ..Default::default()
            },
        }
    }

    fn sample(run: &str, benchmark: &str, elapsed: f64, memory: Option<f64>) -> CoreSample {
        CoreSample {
            run_id: run.to_string(),
            benchmark: benchmark.to_string(),
            core_id: 0,
            elapsed_seconds: elapsed,
            max_memory_mb: memory,
        }
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&[2.0, 4.0, 6.0]).unwrap();

        assert_eq!(summary.count, 3);
        assert!((summary.mean - 4.0).abs() < 1e-9);
        assert!((summary.std - 2.0).abs() < 1e-9);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 6.0);
    }

    #[test]
    fn test_summarize_singleton_std_is_nan() {
        let summary = summarize(&[7.0]).unwrap();

        assert_eq!(summary.count, 1);
        assert!(summary.std.is_nan());
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_aggregate_by_run_kind() {
        let records = vec![
            record("mcf", "a.log.core0", RunKind::Baseline, 10.0, 100.0),
            record("mcf", "a.log.core1", RunKind::Baseline, 12.0, 110.0),
            record("mcf", "b.log.core0", RunKind::Variant, 8.0, 120.0),
        ];

        let stats = MetricsAggregator::new().aggregate(&records, GroupBy::RunKind);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].grouping_key, "baseline");
        let elapsed = stats[0].get(Metric::ElapsedSeconds).unwrap();
        assert_eq!(elapsed.count, 2);
        assert!((elapsed.mean - 11.0).abs() < 1e-9);
        assert_eq!(stats[1].grouping_key, "variant");
        assert!(stats[1].get(Metric::ElapsedSeconds).unwrap().std.is_nan());
    }

    #[test]
    fn test_aggregate_omits_metric_never_present() {
        let mut r = record("lbm", "run_1", RunKind::Baseline, 4.0, 1.0);
        r.usage.user_time = f64::NAN;

        let stats = MetricsAggregator::new().aggregate(&[r], GroupBy::RunIdentifier);

        assert_eq!(stats[0].grouping_key, "run_1");
        assert!(stats[0].get(Metric::UserTime).is_none());
        assert!(stats[0].get(Metric::ElapsedSeconds).is_some());
    }

    #[test]
    fn test_aggregate_is_order_invariant() {
        let records = vec![
            record("mcf", "r0", RunKind::Baseline, 10.0, 100.0),
            record("lbm", "r0", RunKind::Variant, 3.0, 50.0),
            record("mcf", "r1", RunKind::Baseline, 11.5, 101.0),
            record("lbm", "r1", RunKind::Variant, 3.5, 55.0),
            record("mcf", "r2", RunKind::Baseline, 9.25, 99.0),
        ];
        let mut reversed = records.clone();
        reversed.reverse();

        let aggregator = MetricsAggregator::new();
        let forward = aggregator.aggregate(&records, GroupBy::RunKind);
        let backward = aggregator.aggregate(&reversed, GroupBy::RunKind);

        assert_eq!(forward.len(), backward.len());
        for (a, b) in forward.iter().zip(&backward) {
            assert_eq!(a.benchmark, b.benchmark);
            assert_eq!(a.grouping_key, b.grouping_key);
            for (metric, sa) in &a.metrics {
                let sb = b.get(*metric).unwrap();
                assert_eq!(sa.count, sb.count);
                assert!((sa.mean - sb.mean).abs() < 1e-9);
                assert_eq!(sa.min, sb.min);
                assert_eq!(sa.max, sb.max);
                assert!(sa.std.is_nan() == sb.std.is_nan());
                if !sa.std.is_nan() {
                    assert!((sa.std - sb.std).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_average_per_run() {
        let samples = vec![
            sample("20250101-000000", "mcf", 10.0, Some(100.0)),
            sample("20250101-000000", "mcf", 12.0, None),
            sample("20250102-000000", "mcf", 8.0, None),
        ];

        let rows = MetricsAggregator::new().average_per_run(&samples);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].elapsed_seconds, 11.0);
        assert_eq!(rows[0].max_memory_mb, Some(100.0));
        assert_eq!(rows[1].max_memory_mb, None);
    }
}
