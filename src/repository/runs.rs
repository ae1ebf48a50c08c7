//! @ai:module:intent List comparable runs and scan one run's reference logs
//! @ai:module:layer infrastructure
//! @ai:module:public_api RunLister, CoreLog

use super::scanner::capture_core;
use super::{
    file_name, files_matching, is_core_log, subdirectories, warn_missing_directory,
    BENCHMARK_SPEED_DIR,
};
use crate::config::LayoutConfig;
use regex::Regex;
use std::path::{Path, PathBuf};

/// @ai:intent One per-core log of a benchmark's reference run
#[derive(Debug, Clone, PartialEq)]
pub struct CoreLog {
    pub run_id: String,
    pub benchmark: String,
    pub core_id: u32,
    pub path: PathBuf,
}

/// @ai:intent Simplified, non-recursive discovery used for cross-run comparison
pub struct RunLister {
    layout: LayoutConfig,
    run_regex: Regex,
    benchmark_regex: Regex,
    core_regex: Regex,
}

impl RunLister {
    /// @ai:intent Create a lister for the given naming conventions
    /// @ai:effects pure
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            run_regex: Regex::new(r"^20\d{6}-\d{6}").expect("Invalid regex"),
            benchmark_regex: Regex::new(r"^(\d+)\.(.+)").expect("Invalid regex"),
            core_regex: Regex::new(r"\.core(\d+)$").expect("Invalid regex"),
        }
    }

    /// @ai:intent Sorted ids of runs that carry benchmark data
    /// @ai:effects fs:read
    /// @ai:edge_cases missing reports directory yields an empty list with a warning
    pub fn find_all_runs(&self, reports_dir: &Path) -> Vec<String> {
        if !reports_dir.is_dir() {
            warn_missing_directory(reports_dir);
            return Vec::new();
        }

        let mut runs: Vec<String> = subdirectories(reports_dir)
            .into_iter()
            .filter(|d| d.join(BENCHMARK_SPEED_DIR).is_dir())
            .map(|d| file_name(&d))
            .filter(|name| self.run_regex.is_match(name))
            .collect();

        runs.sort();
        runs
    }

    /// @ai:intent Core logs of every `<id>.<name>/ref` benchmark in one run
    /// @ai:effects fs:read
    pub fn core_logs(&self, run_dir: &Path) -> Vec<CoreLog> {
        let run_id = file_name(run_dir);
        let speed_dir = run_dir.join(BENCHMARK_SPEED_DIR);

        if !speed_dir.is_dir() {
            warn_missing_directory(&speed_dir);
            return Vec::new();
        }

        let mut logs = Vec::new();

        for benchmark_dir in subdirectories(&speed_dir) {
            let dir_name = file_name(&benchmark_dir);
            let reference = benchmark_dir.join(&self.layout.reference_run);

            if !reference.is_dir() {
                tracing::warn!(
                    "No {} run for {} in {}, skipping",
                    self.layout.reference_run,
                    dir_name,
                    run_id
                );
                continue;
            }

            let Some(benchmark) = self.bare_benchmark_name(&dir_name) else {
                tracing::warn!("Benchmark directory {} has no numeric id, skipping", dir_name);
                continue;
            };

            for path in files_matching(&reference, is_core_log) {
                logs.push(CoreLog {
                    run_id: run_id.clone(),
                    benchmark: benchmark.clone(),
                    core_id: capture_core(&self.core_regex, &file_name(&path)),
                    path,
                });
            }
        }

        logs
    }

    /// @ai:intent Strip the numeric id prefix of a benchmark directory
    /// @ai:effects pure
    /// @ai:example ("600.perlbench_s") -> Some("perlbench_s")
    pub fn bare_benchmark_name(&self, dir_name: &str) -> Option<String> {
        self.benchmark_regex
            .captures(dir_name)
            .and_then(|c| c.get(2))
            .map(|m| m.as_str().to_string())
    }
}
