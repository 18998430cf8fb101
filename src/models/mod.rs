//! Data models for story result aggregation
//!
//! Result records, per-scope aggregates and the cumulative report they fold into.

mod record;
mod report;
mod scope;

pub use record::{ResultRecord, ResultStatus};
pub use report::CumulativeReport;
pub use scope::{ScopeAggregate, ScopeAggregator};
