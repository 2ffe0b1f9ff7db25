//! Limit Operator: LIMIT/OFFSET clause handling

use crate::error::FlatqResult;
use crate::sql::executor::operators::{Batch, PhysicalOperator};

/// Limit 연산자 (LIMIT/OFFSET)
pub struct LimitOperator {
    input: Box<dyn PhysicalOperator>,
    /// `None` means unlimited
    count: Option<usize>,
    offset: usize,
    /// Total rows emitted so far
    emitted: usize,
    /// Total rows skipped so far (for offset)
    skipped: usize,
}

impl LimitOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, count: Option<usize>, offset: usize) -> Self {
        Self {
            input,
            count,
            offset,
            emitted: 0,
            skipped: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.count
            .map_or(usize::MAX, |count| count.saturating_sub(self.emitted))
    }
}

impl PhysicalOperator for LimitOperator {
    fn next(&mut self) -> FlatqResult<Option<Batch>> {
        // Already reached the limit
        if self.remaining() == 0 {
            return Ok(None);
        }

        loop {
            let Some(mut batch) = self.input.next()? else {
                return Ok(None);
            };

            // Handle offset: skip rows
            if self.skipped < self.offset {
                let to_skip = (self.offset - self.skipped).min(batch.len());
                self.skipped += to_skip;
                batch.drain(..to_skip);
                if batch.is_empty() {
                    continue;
                }
            }

            batch.truncate(self.remaining());
            self.emitted += batch.len();
            return Ok(Some(batch));
        }
    }

    fn reset(&mut self) -> FlatqResult<()> {
        self.emitted = 0;
        self.skipped = 0;
        self.input.reset()
    }
}
