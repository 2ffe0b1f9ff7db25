//! SQL Query Executor Module

use crate::error::FlatqResult;
use crate::storage::Row;
use smallvec::{SmallVec, smallvec};

pub mod coerce;
pub mod expr;
pub mod operators;

pub use expr::{Predicate, compile_all, evaluate, matches_all};
pub use operators::{
    Batch, DistinctOperator, FilterOperator, HashAggregateOperator, JoinOperator, LimitOperator,
    PhysicalOperator, ProjectionOperator, SortOperator, TableScanOperator,
};

/// Pull every remaining batch from an operator and concatenate the rows.
pub fn drain(op: &mut dyn PhysicalOperator) -> FlatqResult<Vec<Row>> {
    let mut batches: SmallVec<[Batch; 8]> = smallvec![];
    while let Some(batch) = op.next()? {
        if !batch.is_empty() {
            batches.push(batch);
        }
    }
    if batches.len() == 1 {
        return Ok(batches.pop().unwrap_or_default());
    }
    Ok(batches.into_iter().flatten().collect())
}
