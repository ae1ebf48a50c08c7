//! @ai:module:intent Metric types for extracted and aggregated measurements
//! @ai:module:layer domain
//! @ai:module:public_api ResourceUsage, MetricRecord, RunKind, Metric, MetricSummary, AggregatedStat, CoreSample, RunAverage, ComparisonResult
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// @ai:intent Classification of a timestamped run directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Baseline,
    Variant,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Baseline => "baseline",
            RunKind::Variant => "variant",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// @ai:intent Numeric fields recovered from one resource-usage report
/// @ai:invariant counters absent from the report are 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub elapsed_seconds: f64,
    pub user_time: f64,
    pub system_time: f64,
    pub cpu_percent: u64,
    pub max_memory_kb: u64,
    pub max_memory_mb: f64,
    pub major_page_faults: u64,
    pub minor_page_faults: u64,
    pub voluntary_context_switches: u64,
    pub involuntary_context_switches: u64,
    pub file_system_inputs: u64,
    pub file_system_outputs: u64,
}

impl ResourceUsage {
    /// @ai:intent Whether the report carries a usable elapsed time
    /// @ai:effects pure
    pub fn is_valid(&self) -> bool {
        self.elapsed_seconds.is_finite() && self.elapsed_seconds > 0.0
    }

    /// @ai:intent Read one aggregatable metric, None when not a finite number
    /// @ai:effects pure
    pub fn value(&self, metric: Metric) -> Option<f64> {
        let raw = match metric {
            Metric::ElapsedSeconds => self.elapsed_seconds,
            Metric::UserTime => self.user_time,
            Metric::SystemTime => self.system_time,
            Metric::CpuPercent => self.cpu_percent as f64,
            Metric::MaxMemoryMb => self.max_memory_mb,
            Metric::MajorPageFaults => self.major_page_faults as f64,
            Metric::MinorPageFaults => self.minor_page_faults as f64,
            Metric::VoluntaryContextSwitches => self.voluntary_context_switches as f64,
            Metric::InvoluntaryContextSwitches => self.involuntary_context_switches as f64,
            Metric::FileSystemInputs => self.file_system_inputs as f64,
            Metric::FileSystemOutputs => self.file_system_outputs as f64,
        };

        raw.is_finite().then_some(raw)
    }
}

/// @ai:intent One process/core measurement with its location in the reports tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub timestamp_id: String,
    pub benchmark: String,
    pub run_identifier: String,
    pub core_id: u32,
    pub run_kind: RunKind,
    #[serde(flatten)]
    pub usage: ResourceUsage,
}

/// @ai:intent The fixed set of metrics the aggregator summarizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ElapsedSeconds,
    UserTime,
    SystemTime,
    CpuPercent,
    MaxMemoryMb,
    MajorPageFaults,
    MinorPageFaults,
    VoluntaryContextSwitches,
    InvoluntaryContextSwitches,
    FileSystemInputs,
    FileSystemOutputs,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Metric::ElapsedSeconds,
        Metric::UserTime,
        Metric::SystemTime,
        Metric::CpuPercent,
        Metric::MaxMemoryMb,
        Metric::MajorPageFaults,
        Metric::MinorPageFaults,
        Metric::VoluntaryContextSwitches,
        Metric::InvoluntaryContextSwitches,
        Metric::FileSystemInputs,
        Metric::FileSystemOutputs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::ElapsedSeconds => "elapsed_seconds",
            Metric::UserTime => "user_time",
            Metric::SystemTime => "system_time",
            Metric::CpuPercent => "cpu_percent",
            Metric::MaxMemoryMb => "max_memory_mb",
            Metric::MajorPageFaults => "major_page_faults",
            Metric::MinorPageFaults => "minor_page_faults",
            Metric::VoluntaryContextSwitches => "voluntary_context_switches",
            Metric::InvoluntaryContextSwitches => "involuntary_context_switches",
            Metric::FileSystemInputs => "file_system_inputs",
            Metric::FileSystemOutputs => "file_system_outputs",
        }
    }
}

/// @ai:intent Summary statistics for one metric within one group
/// @ai:invariant count >= 1; std is NaN when count == 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// @ai:intent Per (benchmark, grouping key) summary of metric records
/// @ai:invariant metrics with no values in the group are absent from `metrics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedStat {
    pub benchmark: String,
    pub grouping_key: String,
    pub metrics: BTreeMap<Metric, MetricSummary>,
}

impl AggregatedStat {
    pub fn get(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.get(&metric)
    }
}

/// @ai:intent Elapsed time and memory of one core in the simplified run scan
#[derive(Debug, Clone, PartialEq)]
pub struct CoreSample {
    pub run_id: String,
    pub benchmark: String,
    pub core_id: u32,
    pub elapsed_seconds: f64,
    pub max_memory_mb: Option<f64>,
}

/// @ai:intent Representative (core-averaged) measurement of a benchmark in a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunAverage {
    pub run_id: String,
    pub benchmark: String,
    pub elapsed_seconds: f64,
    pub max_memory_mb: Option<f64>,
}

/// @ai:intent Delta of one (benchmark, run) pair against the baseline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub benchmark: String,
    #[serde(rename = "run_id")]
    pub run_identifier: String,
    pub baseline_time_sec: f64,
    pub run_time_sec: f64,
    pub time_diff_sec: f64,
    pub time_change_pct: f64,
    pub speedup: f64,
    pub baseline_memory_mb: Option<f64>,
    pub run_memory_mb: Option<f64>,
    pub memory_diff_mb: Option<f64>,
    pub memory_change_pct: Option<f64>,
}
