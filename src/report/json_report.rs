//! @ai:module:intent JSON persistence of extraction breakdowns and aggregated statistics
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter, JsonReporterTrait, ExtractionSummary
//! @ai:module:stateless true

use crate::metrics::{AggregatedStat, MetricRecord};
use crate::repository::RunTypeFilter;
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Serializable snapshot of one extraction pass
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionSummary {
    pub generated_at: String,
    pub run_type: String,
    pub record_count: usize,
    pub records_by_kind: BTreeMap<String, usize>,
    pub records_by_benchmark: BTreeMap<String, usize>,
    pub stats: Vec<AggregatedStat>,
}

impl ExtractionSummary {
    /// @ai:intent Summarize extracted records and their aggregated statistics
    /// @ai:effects time:read
    pub fn new(run_type: RunTypeFilter, records: &[MetricRecord], stats: Vec<AggregatedStat>) -> Self {
        let mut records_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        let mut records_by_benchmark: BTreeMap<String, usize> = BTreeMap::new();
        for record in records {
            *records_by_kind.entry(record.run_kind.to_string()).or_default() += 1;
            *records_by_benchmark.entry(record.benchmark.clone()).or_default() += 1;
        }

        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            run_type: run_type.to_string(),
            record_count: records.len(),
            records_by_kind,
            records_by_benchmark,
            stats,
        }
    }
}

/// @ai:intent Trait for JSON report generation
pub trait JsonReporterTrait: Send + Sync {
    /// @ai:intent Generate JSON report from an extraction summary
    fn generate(&self, summary: &ExtractionSummary, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates JSON reports; undefined std values are written as null
pub struct JsonReporter;

impl JsonReporter {
    /// @ai:intent Create a new JSON reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:intent Generate JSON report to file
    /// @ai:effects fs:write
    fn generate(&self, summary: &ExtractionSummary, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(output_path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{summarize, Metric, ResourceUsage, RunKind};
    use tempfile::TempDir;

    fn record(benchmark: &str, kind: RunKind) -> MetricRecord {
        MetricRecord {
            timestamp_id: "20250101-000000".to_string(),
            benchmark: benchmark.to_string(),
            run_identifier: "x.log.core0".to_string(),
            core_id: 0,
            run_kind: kind,
            usage: ResourceUsage {
                elapsed_seconds: 12.5,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_summary_breakdowns() {
        let records = vec![
            record("mcf", RunKind::Baseline),
            record("mcf", RunKind::Variant),
            record("lbm", RunKind::Variant),
        ];

        let summary = ExtractionSummary::new(RunTypeFilter::All, &records, Vec::new());

        assert_eq!(summary.run_type, "all");
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.records_by_kind["baseline"], 1);
        assert_eq!(summary.records_by_kind["variant"], 2);
        assert_eq!(summary.records_by_benchmark["mcf"], 2);
        assert_eq!(summary.records_by_benchmark["lbm"], 1);
    }

    #[test]
    fn test_generate_json_report() {
        let reporter = JsonReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("data").join("summary.json");

        let mut metrics = BTreeMap::new();
        metrics.insert(Metric::ElapsedSeconds, summarize(&[12.5]).unwrap());
        let stats = vec![AggregatedStat {
            benchmark: "mcf".to_string(),
            grouping_key: "baseline".to_string(),
            metrics,
        }];
        let summary =
            ExtractionSummary::new(RunTypeFilter::Baseline, &[record("mcf", RunKind::Baseline)], stats);

        reporter.generate(&summary, &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        let elapsed = &value["stats"][0]["metrics"]["elapsed_seconds"];

        assert_eq!(value["run_type"], "baseline");
        assert_eq!(value["records_by_kind"]["baseline"], 1);
        assert_eq!(elapsed["mean"], 12.5);
        assert_eq!(elapsed["count"], 1);
        assert!(elapsed["std"].is_null());
    }
}
