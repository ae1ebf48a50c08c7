//! @ai:module:intent Resource-usage log extraction and baseline comparison library
//! @ai:module:layer application
//! @ai:module:public_api config, error, metrics, repository, comparison, report, pipeline

pub mod comparison;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

pub use comparison::{select_baseline, BaselineComparator, BaselineSelection, ComparisonSummary};
pub use config::AnalysisConfig;
pub use error::{Error, ParseError, Result};
pub use metrics::{AggregatedStat, ComparisonResult, MetricExtractor, MetricRecord, MetricsAggregator};
pub use pipeline::{ComparisonOutcome, Extraction, Pipeline};
pub use report::ReportGenerator;
pub use repository::{ReportScanner, RunLister, RunTypeFilter};
