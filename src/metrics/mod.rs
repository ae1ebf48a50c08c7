//! @ai:module:intent Metric extraction, types and aggregation
//! @ai:module:layer application
//! @ai:module:public_api MetricExtractor, MetricsAggregator, MetricRecord, AggregatedStat, ComparisonResult

pub mod aggregator;
pub mod extractor;
pub mod types;

pub use aggregator::{summarize, GroupBy, MetricsAggregator, MetricsAggregatorTrait};
pub use extractor::{parse_time_string, MetricExtractor, ELAPSED_MARKER};
pub use types::{
    AggregatedStat, ComparisonResult, CoreSample, Metric, MetricRecord, MetricSummary,
    ResourceUsage, RunAverage, RunKind,
};
