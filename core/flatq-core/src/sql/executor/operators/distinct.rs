//! Distinct Operator: SELECT DISTINCT

use crate::error::FlatqResult;
use crate::sql::executor::operators::{Batch, PhysicalOperator};
use crate::storage::Value;
use ahash::AHashSet;

/// Distinct 연산자: 첫 번째 등장한 행만 유지
///
/// Runs after projection, so the dedup key is the tuple of projected values
/// in select-list order.
pub struct DistinctOperator {
    input: Box<dyn PhysicalOperator>,
    seen: AHashSet<Vec<Value>>,
}

impl DistinctOperator {
    pub fn new(input: Box<dyn PhysicalOperator>) -> Self {
        Self {
            input,
            seen: AHashSet::new(),
        }
    }
}

impl PhysicalOperator for DistinctOperator {
    fn next(&mut self) -> FlatqResult<Option<Batch>> {
        loop {
            let Some(batch) = self.input.next()? else {
                return Ok(None);
            };
            let unique: Batch = batch
                .into_iter()
                .filter(|row| self.seen.insert(row.values().cloned().collect()))
                .collect();
            if !unique.is_empty() {
                return Ok(Some(unique));
            }
        }
    }

    fn reset(&mut self) -> FlatqResult<()> {
        self.seen.clear();
        self.input.reset()
    }
}
