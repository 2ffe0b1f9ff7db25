//! TableScan Operator: Sequential batch emission

use crate::error::FlatqResult;
use crate::sql::executor::operators::{Batch, PhysicalOperator};
use crate::storage::Row;

/// 테이블 스캔 연산자: 로드된 행을 batch_size 단위로 순차 반환
pub struct TableScanOperator {
    table: String,
    /// Pre-loaded rows to emit
    rows: Vec<Row>,
    batch_size: usize,
    /// Current position in rows
    position: usize,
}

impl TableScanOperator {
    pub fn new(table: impl Into<String>, rows: Vec<Row>, batch_size: usize) -> Self {
        Self {
            table: table.into(),
            rows,
            batch_size: batch_size.max(1),
            position: 0,
        }
    }

    /// Get the table name this operator scans.
    pub fn table_name(&self) -> &str {
        &self.table
    }
}

impl PhysicalOperator for TableScanOperator {
    fn next(&mut self) -> FlatqResult<Option<Batch>> {
        if self.position >= self.rows.len() {
            return Ok(None);
        }

        let end = (self.position + self.batch_size).min(self.rows.len());
        let batch = self.rows[self.position..end].to_vec();
        self.position = end;
        Ok(Some(batch))
    }

    fn reset(&mut self) -> FlatqResult<()> {
        self.position = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::executor::drain;

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| Row::from_pairs([("id", i.to_string())]))
            .collect()
    }

    #[test]
    fn emits_batches_of_batch_size() {
        let mut scan = TableScanOperator::new("t", rows(5), 2);
        let sizes: Vec<usize> = std::iter::from_fn(|| scan.next().unwrap())
            .map(|b| b.len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(scan.table_name(), "t");
    }

    #[test]
    fn reset_rewinds() {
        let mut scan = TableScanOperator::new("t", rows(3), 10);
        assert_eq!(drain(&mut scan).unwrap().len(), 3);
        assert!(scan.next().unwrap().is_none());
        scan.reset().unwrap();
        assert_eq!(drain(&mut scan).unwrap().len(), 3);
    }

    #[test]
    fn empty_table_emits_nothing() {
        let mut scan = TableScanOperator::new("t", Vec::new(), 4);
        assert!(scan.next().unwrap().is_none());
    }
}
