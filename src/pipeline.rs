//! @ai:module:intent Orchestrate extraction, aggregation and baseline comparison
//! @ai:module:layer application
//! @ai:module:public_api Pipeline, Extraction, ComparisonOutcome
//! @ai:module:depends_on config, repository, metrics, comparison

use crate::comparison::{select_baseline, BaselineComparator, BaselineComparatorTrait, BaselineSelection};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::metrics::{
    AggregatedStat, ComparisonResult, CoreSample, GroupBy, MetricExtractor, MetricRecord,
    MetricsAggregator, MetricsAggregatorTrait,
};
use crate::repository::{
    CoreLog, RawReport, ReportLocation, ReportScanner, RunLister, RunTypeFilter,
};
use std::collections::BTreeMap;

/// @ai:intent Valid records of one extraction pass and how many reports were dropped
#[derive(Debug, Clone)]
pub struct Extraction {
    pub records: Vec<MetricRecord>,
    pub skipped: usize,
}

/// @ai:intent Result of the comparison stage; none of these are failures
#[derive(Debug, Clone)]
pub enum ComparisonOutcome {
    NoRuns,
    InsufficientRuns { run_id: String },
    NoData { baseline: BaselineSelection },
    NoBaselineData { baseline: BaselineSelection },
    Compared {
        baseline: BaselineSelection,
        runs: Vec<String>,
        results: Vec<ComparisonResult>,
    },
}

/// @ai:intent Runs the stages over one results directory
pub struct Pipeline {
    config: AnalysisConfig,
    extractor: MetricExtractor,
    aggregator: MetricsAggregator,
    comparator: BaselineComparator,
}

impl Pipeline {
    /// @ai:intent Create a pipeline for a configuration
    /// @ai:effects pure
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            extractor: MetricExtractor::new(),
            aggregator: MetricsAggregator::new(),
            comparator: BaselineComparator::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// @ai:intent Discover and parse all reports admitted by the filter
    /// @ai:effects fs:read
    /// @ai:post every returned record has elapsed_seconds > 0
    /// @ai:edge_cases zero valid records is NoDataFound
    pub fn extract(&self, filter: RunTypeFilter) -> Result<Extraction> {
        let reports_dir = self.config.reports_dir();
        let scanner = ReportScanner::new(self.config.layout.clone());

        let scan = scanner.scan(&reports_dir, filter);

        let mut records = Vec::new();
        let mut skipped = 0;
        let mut tally: BTreeMap<(String, String), usize> =
            scan.benchmarks.into_iter().map(|key| (key, 0)).collect();

        for report in scan.locations.into_iter().filter_map(ReportLocation::load) {
            let successes = tally
                .entry((report.timestamp_id.clone(), report.benchmark.clone()))
                .or_default();

            match self.to_record(report) {
                Some(record) => {
                    *successes += 1;
                    records.push(record);
                }
                None => skipped += 1,
            }
        }

        for ((timestamp_id, benchmark), count) in &tally {
            if *count == 0 {
                tracing::warn!("No successful runs found for {} in {}", benchmark, timestamp_id);
            } else {
                tracing::info!("Found {} successful runs for {} in {}", count, benchmark, timestamp_id);
            }
        }

        if records.is_empty() {
            return Err(Error::NoDataFound { root: reports_dir });
        }

        Ok(Extraction { records, skipped })
    }

    /// @ai:intent Parse one report, dropping it with a diagnostic when unusable
    /// @ai:effects pure
    fn to_record(&self, report: RawReport) -> Option<MetricRecord> {
        let usage = match self.extractor.extract(&report.text) {
            Ok(usage) => usage,
            Err(source) => {
                let err = Error::UnparsableReport {
                    path: report.path,
                    source,
                };
                tracing::warn!("Skipping report: {}", err);
                return None;
            }
        };

        if !usage.is_valid() {
            tracing::warn!("Skipping report without elapsed time: {}", report.path.display());
            return None;
        }

        tracing::debug!(
            "{} {} core {}: {:.2}s elapsed",
            report.benchmark,
            report.run_identifier,
            report.core_id,
            usage.elapsed_seconds
        );

        Some(MetricRecord {
            timestamp_id: report.timestamp_id,
            benchmark: report.benchmark,
            run_identifier: report.run_identifier,
            core_id: report.core_id,
            run_kind: report.run_kind,
            usage,
        })
    }

    /// @ai:intent Per (benchmark, run kind) statistics of extracted records
    /// @ai:effects pure
    pub fn aggregate(&self, records: &[MetricRecord]) -> Vec<AggregatedStat> {
        self.aggregator.aggregate(records, GroupBy::RunKind)
    }

    /// @ai:intent Compare every run's core-averaged timings against the baseline run
    /// @ai:effects fs:read
    pub fn compare(&self) -> ComparisonOutcome {
        let reports_dir = self.config.reports_dir();
        let lister = RunLister::new(self.config.layout.clone());

        let runs = lister.find_all_runs(&reports_dir);
        let Some(baseline) = select_baseline(self.config.reference_baseline(), &runs) else {
            tracing::info!("No benchmark runs found for comparison analysis");
            return ComparisonOutcome::NoRuns;
        };

        tracing::info!("Found {} benchmark runs", runs.len());
        baseline.log(&runs);

        if runs.len() < 2 {
            tracing::info!("Only one run found ({}), no comparison possible", baseline.run_id);
            return ComparisonOutcome::InsufficientRuns {
                run_id: baseline.run_id,
            };
        }

        let mut samples = Vec::new();
        for run_id in &runs {
            tracing::info!("Processing run: {}", run_id);
            for log in lister.core_logs(&reports_dir.join(run_id)) {
                samples.extend(self.to_sample(log));
            }
        }

        if samples.is_empty() {
            tracing::warn!("No valid benchmark data found for comparison");
            return ComparisonOutcome::NoData { baseline };
        }

        let rows = self.aggregator.average_per_run(&samples);
        if !rows.iter().any(|r| r.run_id == baseline.run_id) {
            tracing::warn!("No data found for baseline: {}", baseline.run_id);
            return ComparisonOutcome::NoBaselineData { baseline };
        }

        let results = self.comparator.compare(&rows, &baseline.run_id);
        ComparisonOutcome::Compared {
            baseline,
            runs,
            results,
        }
    }

    /// @ai:intent Read one core log into a sample, skipping unusable files
    /// @ai:effects fs:read
    fn to_sample(&self, log: CoreLog) -> Option<CoreSample> {
        let text = match std::fs::read_to_string(&log.path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping unreadable log {}: {}", log.path.display(), e);
                return None;
            }
        };

        match self.extractor.extract_elapsed_and_memory(&text) {
            Ok(Some((elapsed_seconds, max_memory_mb))) => Some(CoreSample {
                run_id: log.run_id,
                benchmark: log.benchmark,
                core_id: log.core_id,
                elapsed_seconds,
                max_memory_mb,
            }),
            Ok(None) => {
                tracing::warn!("Skipping log without elapsed time: {}", log.path.display());
                None
            }
            Err(source) => {
                let err = Error::UnparsableReport {
                    path: log.path,
                    source,
                };
                tracing::warn!("Skipping log: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::BaselineSource;
    use crate::metrics::RunKind;
    use crate::test_support::capture_logs;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn report(elapsed: &str, memory_kb: Option<u64>) -> String {
        let mut text = format!(
            "\tUser time (seconds): 1.00\n\tElapsed (wall clock) time (h:mm:ss or m:ss): {elapsed}\n"
        );
        if let Some(kb) = memory_kb {
            text.push_str(&format!("\tMaximum resident set size (kbytes): {kb}\n"));
        }
        text
    }

    fn write(results: &Path, rel: &str, content: &str) {
        let path = results.join("reports").join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn pipeline(results: &Path, baseline: Option<&str>) -> Pipeline {
        let mut config = AnalysisConfig::default();
        config.paths.results_dir = results.to_string_lossy().into_owned();
        config.comparison.reference_baseline = baseline.map(str::to_string);
        Pipeline::new(config)
    }

    fn two_runs() -> TempDir {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "20250101-000000/benchmark_speed/500.X/ref/x.log.core0",
            &report("0:10.00", Some(102400)),
        );
        write(
            temp.path(),
            "20250102-000000_dpf/benchmark_speed/500.X/ref/x.log.core0",
            &report("0:08.00", Some(122880)),
        );
        temp
    }

    #[test]
    fn test_end_to_end_speedup_and_memory() {
        let temp = two_runs();

        let ComparisonOutcome::Compared { baseline, results, .. } = pipeline(temp.path(), None).compare() else {
            panic!("expected a comparison");
        };

        assert_eq!(baseline.run_id, "20250101-000000");
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[1],
            ComparisonResult {
                benchmark: "X".to_string(),
                run_identifier: "20250102-000000_dpf".to_string(),
                baseline_time_sec: 10.0,
                run_time_sec: 8.0,
                time_diff_sec: -2.0,
                time_change_pct: -20.0,
                speedup: 1.25,
                baseline_memory_mb: Some(100.0),
                run_memory_mb: Some(120.0),
                memory_diff_mb: Some(20.0),
                memory_change_pct: Some(20.0),
            }
        );
    }

    #[test]
    fn test_unknown_baseline_falls_back_to_earliest() {
        let temp = two_runs();

        let outcome = pipeline(temp.path(), Some("20240101-000000")).compare();

        let ComparisonOutcome::Compared { baseline, results, runs } = outcome else {
            panic!("expected a comparison");
        };
        assert_eq!(baseline.run_id, "20250101-000000");
        assert!(matches!(baseline.source, BaselineSource::Fallback { .. }));
        assert_eq!(runs.len(), 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_single_run_is_insufficient_but_extracts() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "20250101-000000/benchmark_speed/500.X/ref/x.log.core0",
            &report("0:10.00", Some(102400)),
        );
        let pipeline = pipeline(temp.path(), None);

        let extraction = pipeline.extract(RunTypeFilter::All).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].benchmark, "500.X");
        assert_eq!(extraction.records[0].run_kind, RunKind::Baseline);

        assert!(matches!(
            pipeline.compare(),
            ComparisonOutcome::InsufficientRuns { ref run_id } if run_id == "20250101-000000"
        ));
    }

    #[test]
    fn test_no_data_is_an_error() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "20250101-000000/benchmark_speed/500.X/ref/x.log.core0",
            "Command terminated by signal 9\n",
        );

        let err = pipeline(temp.path(), None).extract(RunTypeFilter::All).unwrap_err();
        assert!(matches!(err, Error::NoDataFound { .. }));
    }

    #[test]
    fn test_invalid_reports_never_reach_aggregation() {
        let temp = TempDir::new().unwrap();
        let base = "20250101-000000/benchmark_speed/500.X/ref";
        write(temp.path(), &format!("{base}/x.log.core0"), &report("0:04.00", None));
        write(temp.path(), &format!("{base}/x.log.core1"), &report("0:00.00", None));
        write(temp.path(), &format!("{base}/x.log.core2"), &report("never", None));
        write(
            temp.path(),
            &format!("{base}/x.log.core3"),
            &format!("{}Voluntary context switches: 999999999999999999999999\n", report("0:05.00", None)),
        );
        let pipeline = pipeline(temp.path(), None);

        let extraction = pipeline.extract(RunTypeFilter::All).unwrap();

        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.skipped, 3);
        assert!(extraction.records.iter().all(|r| r.usage.elapsed_seconds > 0.0));

        let stats = pipeline.aggregate(&extraction.records);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].grouping_key, "baseline");
    }

    #[test]
    fn test_multi_core_runs_are_averaged() {
        let temp = two_runs();
        write(
            temp.path(),
            "20250102-000000_dpf/benchmark_speed/500.X/ref/x.log.core1",
            &report("0:12.00", None),
        );

        let ComparisonOutcome::Compared { results, .. } = pipeline(temp.path(), None).compare() else {
            panic!("expected a comparison");
        };

        let variant = &results[1];
        assert_eq!(variant.run_time_sec, 10.0);
        assert_eq!(variant.speedup, 1.0);
        assert_eq!(variant.run_memory_mb, Some(120.0));
    }

    #[test]
    fn test_benchmarks_without_usable_reports_are_reported() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "20250101-000000/benchmark_speed/500.X/ref/x.log.core0",
            &report("0:10.00", None),
        );
        write(
            temp.path(),
            "20250101-000000/benchmark_speed/501.Y/ref/y.log.core0",
            "Command terminated by signal 9\n",
        );
        write(temp.path(), "20250101-000000/benchmark_speed/502.Z/ref/notes.txt", "");
        let pipeline = pipeline(temp.path(), None);

        let (extraction, logs) = capture_logs(|| pipeline.extract(RunTypeFilter::All));
        let extraction = extraction.unwrap();

        assert_eq!(extraction.records.len(), 1);
        assert!(logs.contains("Found 1 successful runs for 500.X in 20250101-000000"));
        assert!(logs.contains("No successful runs found for 501.Y in 20250101-000000"));
        assert!(logs.contains("No successful runs found for 502.Z in 20250101-000000"));
        assert!(logs.contains("Skipping report without timing output"));
    }

    #[test]
    fn test_log_without_elapsed_time_is_reported_in_comparison() {
        let temp = two_runs();
        write(
            temp.path(),
            "20250102-000000_dpf/benchmark_speed/500.X/ref/x.log.core1",
            "Maximum resident set size (kbytes): 1024\n",
        );

        let (outcome, logs) = capture_logs(|| pipeline(temp.path(), None).compare());

        assert!(matches!(outcome, ComparisonOutcome::Compared { .. }));
        assert!(logs.contains("Skipping log without elapsed time"));
        assert!(logs.contains("x.log.core1"));
    }

    #[test]
    fn test_no_runs() {
        let temp = TempDir::new().unwrap();

        assert!(matches!(pipeline(temp.path(), None).compare(), ComparisonOutcome::NoRuns));
    }
}
