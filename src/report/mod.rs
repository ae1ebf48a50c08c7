//! @ai:module:intent Console rendering and durable persistence of results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, ConsoleReporter, CsvReporter, JsonReporter, generation_timestamp

pub mod console;
pub mod csv_report;
pub mod json_report;

pub use console::{ConsoleReporter, ConsoleReporterTrait};
pub use csv_report::{round3, CsvReporter, CsvReporterTrait};
pub use json_report::{ExtractionSummary, JsonReporter, JsonReporterTrait};

use crate::metrics::{ComparisonResult, MetricRecord};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// @ai:intent Files written for one extraction pass
#[derive(Debug, Clone)]
pub struct ExtractionArtifacts {
    pub detailed_csv: PathBuf,
    pub summary_json: PathBuf,
}

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    console: ConsoleReporter,
    csv: CsvReporter,
    json: JsonReporter,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            console: ConsoleReporter::new(),
            csv: CsvReporter::new(),
            json: JsonReporter::new(),
        }
    }

    pub fn console(&self) -> &ConsoleReporter {
        &self.console
    }

    /// @ai:intent Persist detailed records and aggregated statistics
    /// @ai:effects fs:write
    pub fn persist_extraction(
        &self,
        records: &[MetricRecord],
        summary: &ExtractionSummary,
        output_dir: &Path,
        timestamp: &str,
    ) -> Result<ExtractionArtifacts> {
        std::fs::create_dir_all(output_dir)?;

        let detailed_csv = unique_path(output_dir, "performance_detailed", timestamp, "csv");
        self.csv.write_records(records, &detailed_csv)?;

        let summary_json = unique_path(output_dir, "performance_summary", timestamp, "json");
        self.json.generate(summary, &summary_json)?;

        tracing::info!("Extraction data saved in {}", output_dir.display());
        Ok(ExtractionArtifacts {
            detailed_csv,
            summary_json,
        })
    }

    /// @ai:intent Persist comparison rows under a generation-timestamped name
    /// @ai:effects fs:write
    /// @ai:post never overwrites an existing artifact
    pub fn persist_comparison(
        &self,
        results: &[ComparisonResult],
        csv_dir: &Path,
        timestamp: &str,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(csv_dir)?;

        let path = unique_path(csv_dir, "performance_comparison", timestamp, "csv");
        self.csv.write_comparisons(results, &path)?;

        tracing::info!("Detailed comparison saved to: {}", path.display());
        Ok(path)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// @ai:intent Local time formatted for artifact names
/// @ai:effects time:read
pub fn generation_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// @ai:intent `<stem>_<timestamp>.<ext>`, suffixed with a counter if taken
/// @ai:effects fs:read
fn unique_path(dir: &Path, stem: &str, timestamp: &str, ext: &str) -> PathBuf {
    let candidate = dir.join(format!("{stem}_{timestamp}.{ext}"));
    if !candidate.exists() {
        return candidate;
    }

    (1..)
        .map(|n| dir.join(format!("{stem}_{timestamp}_{n}.{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
