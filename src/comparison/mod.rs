//! @ai:module:intent Baseline selection and baseline-relative comparison
//! @ai:module:layer application
//! @ai:module:public_api BaselineComparator, BaselineSelection, ComparisonSummary, select_baseline

pub mod baseline;
pub mod comparator;

pub use baseline::{select_baseline, BaselineSelection, BaselineSource};
pub use comparator::{compare_pair, BaselineComparator, BaselineComparatorTrait, ComparisonSummary};
