//! @ai:module:intent Compute baseline-relative time and memory deltas
//! @ai:module:layer application
//! @ai:module:public_api BaselineComparator, BaselineComparatorTrait, ComparisonSummary, compare_pair
//! @ai:module:stateless true

use crate::metrics::{ComparisonResult, RunAverage};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// @ai:intent Trait for baseline comparison
pub trait BaselineComparatorTrait: Send + Sync {
    /// @ai:intent Compare every (run, benchmark) row with the baseline row of its benchmark
    fn compare(&self, rows: &[RunAverage], baseline_id: &str) -> Vec<ComparisonResult>;
}

/// @ai:intent Compares core-averaged runs against one baseline run
pub struct BaselineComparator;

impl BaselineComparator {
    /// @ai:intent Create a new comparator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for BaselineComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl BaselineComparatorTrait for BaselineComparator {
    /// @ai:intent Benchmarks without a baseline row are skipped
    /// @ai:effects pure
    /// @ai:post the baseline run is compared with itself (speedup 1.0)
    fn compare(&self, rows: &[RunAverage], baseline_id: &str) -> Vec<ComparisonResult> {
        let mut by_benchmark: BTreeMap<&str, Vec<&RunAverage>> = BTreeMap::new();
        for row in rows {
            by_benchmark.entry(row.benchmark.as_str()).or_default().push(row);
        }

        let mut results = Vec::new();

        for (benchmark, runs) in by_benchmark {
            let Some(baseline) = runs.iter().find(|r| r.run_id == baseline_id) else {
                tracing::warn!("No baseline data for {} in {}, skipping", benchmark, baseline_id);
                continue;
            };

            results.extend(runs.iter().map(|run| compare_pair(baseline, run)));
        }

        results
    }
}

/// @ai:intent Delta of one run against the baseline for the same benchmark
/// @ai:effects pure
/// @ai:post speedup = baseline / run when run > 0, else 0
/// @ai:post time_change_pct = 0 when baseline time is 0
/// @ai:post memory deltas are None when either side is missing; pct also needs baseline > 0
pub fn compare_pair(baseline: &RunAverage, run: &RunAverage) -> ComparisonResult {
    let baseline_time = baseline.elapsed_seconds;
    let run_time = run.elapsed_seconds;
    let time_diff = run_time - baseline_time;

    let time_change_pct = if baseline_time > 0.0 {
        time_diff / baseline_time * 100.0
    } else {
        0.0
    };

    let speedup = if run_time > 0.0 {
        baseline_time / run_time
    } else {
        0.0
    };

    let memory_diff = match (run.max_memory_mb, baseline.max_memory_mb) {
        (Some(r), Some(b)) => Some(r - b),
        _ => None,
    };

    let memory_change_pct = match (memory_diff, baseline.max_memory_mb) {
        (Some(diff), Some(b)) if b > 0.0 => Some(diff / b * 100.0),
        _ => None,
    };

    ComparisonResult {
        benchmark: run.benchmark.clone(),
        run_identifier: run.run_id.clone(),
        baseline_time_sec: baseline_time,
        run_time_sec: run_time,
        time_diff_sec: time_diff,
        time_change_pct,
        speedup,
        baseline_memory_mb: baseline.max_memory_mb,
        run_memory_mb: run.max_memory_mb,
        memory_diff_mb: memory_diff,
        memory_change_pct,
    }
}

/// @ai:intent Overall speedup statistics of a comparison table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub total_runs: usize,
    pub total_rows: usize,
    pub mean_speedup: f64,
    pub best_speedup: f64,
    pub worst_speedup: f64,
    pub improvements: usize,
    pub regressions: usize,
}

impl ComparisonSummary {
    /// @ai:intent Summarize comparison rows
    /// @ai:effects pure
    /// @ai:post None for an empty table
    pub fn from_results(results: &[ComparisonResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }

        let speedups: Vec<f64> = results.iter().map(|r| r.speedup).collect();
        let runs: BTreeSet<&str> = results.iter().map(|r| r.run_identifier.as_str()).collect();

        Some(Self {
            total_runs: runs.len(),
            total_rows: results.len(),
            mean_speedup: speedups.iter().sum::<f64>() / speedups.len() as f64,
            best_speedup: speedups.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst_speedup: speedups.iter().copied().fold(f64::INFINITY, f64::min),
            improvements: speedups.iter().filter(|s| **s > 1.0).count(),
            regressions: speedups.iter().filter(|s| **s < 1.0).count(),
        })
    }

    pub fn improvement_pct(&self) -> f64 {
        self.improvements as f64 / self.total_rows as f64 * 100.0
    }

    pub fn regression_pct(&self) -> f64 {
        self.regressions as f64 / self.total_rows as f64 * 100.0
    }
}
