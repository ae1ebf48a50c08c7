//! @ai:module:intent Discover run, benchmark and core log files in a reports tree
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportScanner, RawReport, RunTypeFilter, RunLister, CoreLog, classify_run
//! @ai:module:depends_on config, metrics::types

pub mod runs;
pub mod scanner;

pub use runs::{CoreLog, RunLister};
pub use scanner::{RawReport, ReportLocation, ReportScanner, Scan};

use crate::error::Error;
use crate::metrics::RunKind;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

/// Directory under each run that holds the per-benchmark results.
pub const BENCHMARK_SPEED_DIR: &str = "benchmark_speed";

/// @ai:intent Which timestamp directories a scan includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunTypeFilter {
    #[default]
    All,
    Baseline,
    Variant,
    /// Only the lexicographically last timestamp directory, of either kind.
    Current,
}

impl RunTypeFilter {
    /// @ai:intent Whether a run of the given kind passes the kind filter
    /// @ai:effects pure
    pub fn admits(&self, kind: RunKind) -> bool {
        match self {
            RunTypeFilter::Baseline => kind == RunKind::Baseline,
            RunTypeFilter::Variant => kind == RunKind::Variant,
            RunTypeFilter::All | RunTypeFilter::Current => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunTypeFilter::All => "all",
            RunTypeFilter::Baseline => "baseline",
            RunTypeFilter::Variant => "variant",
            RunTypeFilter::Current => "current",
        }
    }
}

impl fmt::Display for RunTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunTypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(RunTypeFilter::All),
            "baseline" => Ok(RunTypeFilter::Baseline),
            "variant" | "dpf" => Ok(RunTypeFilter::Variant),
            "current" => Ok(RunTypeFilter::Current),
            other => Err(format!(
                "unknown run type '{other}' (expected all, baseline, variant or current)"
            )),
        }
    }
}

/// @ai:intent Classify a timestamp directory by its name suffix
/// @ai:effects pure
/// @ai:example ("20250101-120000_dpf", "_dpf") -> Variant
pub fn classify_run(dir_name: &str, variant_suffix: &str) -> RunKind {
    if !variant_suffix.is_empty() && dir_name.ends_with(variant_suffix) {
        RunKind::Variant
    } else {
        RunKind::Baseline
    }
}

/// @ai:intent Immediate subdirectories of a directory, sorted by name
/// @ai:effects fs:read
fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    immediate_entries(dir)
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect()
}

/// @ai:intent Immediate regular files of a directory whose name satisfies a predicate
/// @ai:effects fs:read
fn files_matching(dir: &Path, predicate: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    immediate_entries(dir)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_str().map(&predicate).unwrap_or(false))
        .map(|e| e.into_path())
        .collect()
}

fn immediate_entries(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
}

/// @ai:intent Log a subtree skipped because its directory is absent
/// @ai:effects io
fn warn_missing_directory(path: &Path) {
    let err = Error::MissingDirectory {
        path: path.to_path_buf(),
    };
    tracing::warn!("Skipping: {}", err);
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// @ai:intent Core log naming convention: `<name>.log.core<N>`
/// @ai:effects pure
fn is_core_log(name: &str) -> bool {
    name.contains(".log.core")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_run() {
        assert_eq!(classify_run("20250101-120000_dpf", "_dpf"), RunKind::Variant);
        assert_eq!(classify_run("20250101-120000_quick", "_dpf"), RunKind::Baseline);
        assert_eq!(classify_run("20250101-120000", "_dpf"), RunKind::Baseline);
        assert_eq!(classify_run("20250101-120000_dpf", ""), RunKind::Baseline);
    }

    #[test]
    fn test_run_type_filter_parse() {
        assert_eq!("all".parse::<RunTypeFilter>().unwrap(), RunTypeFilter::All);
        assert_eq!("DPF".parse::<RunTypeFilter>().unwrap(), RunTypeFilter::Variant);
        assert_eq!("current".parse::<RunTypeFilter>().unwrap(), RunTypeFilter::Current);
        assert!("nightly".parse::<RunTypeFilter>().is_err());
    }

    #[test]
    fn test_filter_admits() {
        assert!(RunTypeFilter::Baseline.admits(RunKind::Baseline));
        assert!(!RunTypeFilter::Baseline.admits(RunKind::Variant));
        assert!(RunTypeFilter::Current.admits(RunKind::Variant));
    }

    #[test]
    fn test_is_core_log() {
        assert!(is_core_log("perlbench.log.core3"));
        assert!(!is_core_log("perlbench.log"));
    }
}
