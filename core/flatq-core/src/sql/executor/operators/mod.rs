//! Physical Operators Module

mod distinct;
mod filter;
mod hash_aggregate;
mod join;
mod limit;
mod physical_operator;
mod projection;
mod sort;
mod table_scan;

pub use distinct::DistinctOperator;
pub use filter::FilterOperator;
pub use hash_aggregate::{GroupKey, HashAggregateOperator, aggregate_grouped};
pub use join::{
    JoinContext, JoinOperator, build_result_row, inner_join, join_rows, left_join,
    require_field, resolve_field, right_join,
};
pub use limit::LimitOperator;
pub use physical_operator::{Batch, PhysicalOperator};
pub use projection::{ProjectionOperator, project_row};
pub use sort::{SortOperator, sort_rows};
pub use table_scan::TableScanOperator;
