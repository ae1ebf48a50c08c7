//! @ai:module:intent CSV persistence of comparison results and extracted records
//! @ai:module:layer infrastructure
//! @ai:module:public_api CsvReporter, CsvReporterTrait, round3
//! @ai:module:stateless true

use crate::metrics::{ComparisonResult, MetricRecord};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// @ai:intent Trait for CSV report generation
pub trait CsvReporterTrait: Send + Sync {
    /// @ai:intent Write one row per comparison result
    fn write_comparisons(&self, results: &[ComparisonResult], output_path: &Path) -> Result<()>;

    /// @ai:intent Write one row per extracted record
    fn write_records(&self, records: &[MetricRecord], output_path: &Path) -> Result<()>;
}

/// @ai:intent Writes tabular artifacts with numeric columns rounded to 3 decimals
pub struct CsvReporter;

#[derive(Serialize)]
struct ComparisonRow<'a> {
    benchmark: &'a str,
    run_id: &'a str,
    baseline_time_sec: f64,
    run_time_sec: f64,
    time_diff_sec: f64,
    time_change_pct: f64,
    speedup: f64,
    baseline_memory_mb: Option<f64>,
    run_memory_mb: Option<f64>,
    memory_diff_mb: Option<f64>,
    memory_change_pct: Option<f64>,
}

impl<'a> From<&'a ComparisonResult> for ComparisonRow<'a> {
    fn from(r: &'a ComparisonResult) -> Self {
        Self {
            benchmark: &r.benchmark,
            run_id: &r.run_identifier,
            baseline_time_sec: round3(r.baseline_time_sec),
            run_time_sec: round3(r.run_time_sec),
            time_diff_sec: round3(r.time_diff_sec),
            time_change_pct: round3(r.time_change_pct),
            speedup: round3(r.speedup),
            baseline_memory_mb: r.baseline_memory_mb.map(round3),
            run_memory_mb: r.run_memory_mb.map(round3),
            memory_diff_mb: r.memory_diff_mb.map(round3),
            memory_change_pct: r.memory_change_pct.map(round3),
        }
    }
}

#[derive(Serialize)]
struct RecordRow<'a> {
    timestamp: &'a str,
    benchmark: &'a str,
    run_id: &'a str,
    core: u32,
    run_type: &'a str,
    elapsed_seconds: f64,
    user_time: f64,
    system_time: f64,
    cpu_percent: u64,
    max_memory_kb: u64,
    max_memory_mb: f64,
    major_page_faults: u64,
    minor_page_faults: u64,
    voluntary_context_switches: u64,
    involuntary_context_switches: u64,
    file_system_inputs: u64,
    file_system_outputs: u64,
}

impl<'a> From<&'a MetricRecord> for RecordRow<'a> {
    fn from(r: &'a MetricRecord) -> Self {
        let u = &r.usage;
        Self {
            timestamp: &r.timestamp_id,
            benchmark: &r.benchmark,
            run_id: &r.run_identifier,
            core: r.core_id,
            run_type: r.run_kind.as_str(),
            elapsed_seconds: round3(u.elapsed_seconds),
            user_time: round3(u.user_time),
            system_time: round3(u.system_time),
            cpu_percent: u.cpu_percent,
            max_memory_kb: u.max_memory_kb,
            max_memory_mb: round3(u.max_memory_mb),
            major_page_faults: u.major_page_faults,
            minor_page_faults: u.minor_page_faults,
            voluntary_context_switches: u.voluntary_context_switches,
            involuntary_context_switches: u.involuntary_context_switches,
            file_system_inputs: u.file_system_inputs,
            file_system_outputs: u.file_system_outputs,
        }
    }
}

impl CsvReporter {
    /// @ai:intent Create a new CSV reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    fn write_rows<T: Serialize>(rows: impl IntoIterator<Item = T>, output_path: &Path) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReporterTrait for CsvReporter {
    /// @ai:effects fs:write
    fn write_comparisons(&self, results: &[ComparisonResult], output_path: &Path) -> Result<()> {
        Self::write_rows(results.iter().map(ComparisonRow::from), output_path)
    }

    /// @ai:effects fs:write
    fn write_records(&self, records: &[MetricRecord], output_path: &Path) -> Result<()> {
        Self::write_rows(records.iter().map(RecordRow::from), output_path)
    }
}

/// @ai:intent Round to 3 decimal places
/// @ai:effects pure
/// @ai:example (1.23456) -> 1.235
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
