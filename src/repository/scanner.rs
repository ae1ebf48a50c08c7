//! @ai:module:intent Full scan of timestamped run directories for resource-usage reports
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportScanner, RawReport, ReportLocation, Scan
//! @ai:module:stateless true

use super::{
    classify_run, file_name, files_matching, is_core_log, subdirectories, warn_missing_directory,
    RunTypeFilter, BENCHMARK_SPEED_DIR,
};
use crate::config::LayoutConfig;
use crate::metrics::{RunKind, ELAPSED_MARKER};
use regex::Regex;
use std::path::{Path, PathBuf};

/// @ai:intent Where one report lives and what it measures
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLocation {
    pub timestamp_id: String,
    pub benchmark: String,
    pub run_identifier: String,
    pub core_id: u32,
    pub run_kind: RunKind,
    pub path: PathBuf,
}

/// @ai:intent A located report together with its text
#[derive(Debug, Clone, PartialEq)]
pub struct RawReport {
    pub timestamp_id: String,
    pub benchmark: String,
    pub run_identifier: String,
    pub core_id: u32,
    pub run_kind: RunKind,
    pub path: PathBuf,
    pub text: String,
}

impl ReportLocation {
    /// @ai:intent Read the report, skipping files without timing output
    /// @ai:effects fs:read
    pub fn load(self) -> Option<RawReport> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping unreadable report {}: {}", self.path.display(), e);
                return None;
            }
        };

        if !text.contains(ELAPSED_MARKER) {
            tracing::warn!("Skipping report without timing output: {}", self.path.display());
            return None;
        }

        Some(RawReport {
            timestamp_id: self.timestamp_id,
            benchmark: self.benchmark,
            run_identifier: self.run_identifier,
            core_id: self.core_id,
            run_kind: self.run_kind,
            path: self.path,
            text,
        })
    }
}

/// @ai:intent Located reports plus every (timestamp, benchmark) that had run directories
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scan {
    /// Visited even when no report file was found, so empty benchmarks stay reportable.
    pub benchmarks: Vec<(String, String)>,
    pub locations: Vec<ReportLocation>,
}

/// @ai:intent Walks `reports/<timestamp>/benchmark_speed/<benchmark>/<run>/`
pub struct ReportScanner {
    layout: LayoutConfig,
    timestamp_regex: Regex,
    run_core_regex: Regex,
    log_core_regex: Regex,
}

impl ReportScanner {
    /// @ai:intent Create a scanner for the given naming conventions
    /// @ai:effects pure
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            timestamp_regex: Regex::new(r"^\d{8}-\d{6}").expect("Invalid regex"),
            run_core_regex: Regex::new(r"run_base_speed_.*\.(\d+)").expect("Invalid regex"),
            log_core_regex: Regex::new(r"\.core(\d+)").expect("Invalid regex"),
        }
    }

    /// @ai:intent Lazily yield every readable report admitted by the filter
    /// @ai:effects fs:read
    pub fn discover(
        &self,
        reports_dir: &Path,
        filter: RunTypeFilter,
    ) -> impl Iterator<Item = RawReport> {
        self.scan(reports_dir, filter)
            .locations
            .into_iter()
            .filter_map(ReportLocation::load)
    }

    /// @ai:intent Timestamp directories selected by the filter, with their kind
    /// @ai:effects fs:read
    /// @ai:edge_cases a missing reports directory yields nothing and a warning
    pub fn timestamp_dirs(&self, reports_dir: &Path, filter: RunTypeFilter) -> Vec<(PathBuf, RunKind)> {
        if !reports_dir.is_dir() {
            warn_missing_directory(reports_dir);
            return Vec::new();
        }

        tracing::info!("Scanning for results in: {}", reports_dir.display());

        let mut dirs: Vec<PathBuf> = subdirectories(reports_dir)
            .into_iter()
            .filter(|d| self.timestamp_regex.is_match(&file_name(d)))
            .collect();
        tracing::info!("Found {} timestamp directories", dirs.len());

        if filter == RunTypeFilter::Current {
            dirs.sort_by_key(|d| file_name(d));
            let last = dirs.pop();
            dirs = last.into_iter().collect();
            tracing::info!("Processing only the most recent run: {} directory", dirs.len());
        }

        dirs.into_iter()
            .map(|d| {
                let kind = classify_run(&file_name(&d), &self.layout.variant_suffix);
                (d, kind)
            })
            .filter(|(_, kind)| filter.admits(*kind))
            .collect()
    }

    /// @ai:intent Locate report files without reading them
    /// @ai:effects fs:read
    pub fn locate(&self, reports_dir: &Path, filter: RunTypeFilter) -> Vec<ReportLocation> {
        self.scan(reports_dir, filter).locations
    }

    /// @ai:intent Locate report files and record which benchmarks were visited
    /// @ai:effects fs:read
    /// @ai:post a benchmark with run directories is listed even if it yields no location
    pub fn scan(&self, reports_dir: &Path, filter: RunTypeFilter) -> Scan {
        let mut scan = Scan::default();

        for (timestamp_dir, run_kind) in self.timestamp_dirs(reports_dir, filter) {
            let timestamp_id = file_name(&timestamp_dir);
            tracing::info!("Processing: {}", timestamp_id);

            let speed_dir = timestamp_dir.join(BENCHMARK_SPEED_DIR);
            if !speed_dir.is_dir() {
                warn_missing_directory(&speed_dir);
                continue;
            }

            for benchmark_dir in subdirectories(&speed_dir) {
                let benchmark = file_name(&benchmark_dir);
                tracing::debug!("Processing benchmark: {}", benchmark);

                let run_dirs: Vec<PathBuf> = subdirectories(&benchmark_dir)
                    .into_iter()
                    .filter(|d| self.is_run_dir(&file_name(d)))
                    .collect();

                if run_dirs.is_empty() {
                    tracing::warn!("No run directories found for {} in {}", benchmark, timestamp_id);
                    continue;
                }

                scan.benchmarks.push((timestamp_id.clone(), benchmark.clone()));

                for run_dir in run_dirs {
                    for (path, run_identifier, core_id) in self.reports_in_run(&run_dir) {
                        scan.locations.push(ReportLocation {
                            timestamp_id: timestamp_id.clone(),
                            benchmark: benchmark.clone(),
                            run_identifier,
                            core_id,
                            run_kind,
                            path,
                        });
                    }
                }
            }
        }

        scan
    }

    fn is_run_dir(&self, name: &str) -> bool {
        name.starts_with(&self.layout.run_prefix) || name == self.layout.reference_run
    }

    /// @ai:intent Canonical output if present, otherwise all core logs
    /// @ai:effects fs:read
    fn reports_in_run(&self, run_dir: &Path) -> Vec<(PathBuf, String, u32)> {
        let run_name = file_name(run_dir);
        let canonical = run_dir.join(&self.layout.canonical_output);

        if canonical.is_file() {
            let core_id = capture_core(&self.run_core_regex, &run_name);
            return vec![(canonical, run_name, core_id)];
        }

        let logs = files_matching(run_dir, is_core_log);
        if logs.is_empty() {
            tracing::warn!(
                "No {} or core logs in {}",
                self.layout.canonical_output,
                run_dir.display()
            );
        }

        logs.into_iter()
            .map(|path| {
                let log_name = file_name(&path);
                let core_id = capture_core(&self.log_core_regex, &log_name);
                (path, log_name, core_id)
            })
            .collect()
    }
}

/// @ai:intent Numeric core index from a name, 0 when not recoverable
/// @ai:effects pure
pub(crate) fn capture_core(re: &Regex, name: &str) -> u32 {
    re.captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
