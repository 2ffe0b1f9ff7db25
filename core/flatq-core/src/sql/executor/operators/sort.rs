//! Sort Operator: ORDER BY clause handling

use crate::error::FlatqResult;
use crate::sql::executor::drain;
use crate::sql::executor::operators::{Batch, PhysicalOperator};
use crate::sql::planner::OrderBySpec;
use crate::storage::{Row, Value};
use std::cmp::Ordering;

/// Sort 연산자 (ORDER BY): 전체 입력을 모은 뒤 안정 정렬
pub struct SortOperator {
    input: Box<dyn PhysicalOperator>,
    order_by: Vec<OrderBySpec>,
    default_table: Option<String>,
    /// Materialized sorted result (sort requires all data)
    sorted: Option<Batch>,
    emitted: bool,
}

impl SortOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        order_by: Vec<OrderBySpec>,
        default_table: Option<String>,
    ) -> Self {
        Self {
            input,
            order_by,
            default_table,
            sorted: None,
            emitted: false,
        }
    }

    fn materialize(&mut self) -> FlatqResult<()> {
        let mut rows = drain(self.input.as_mut())?;
        sort_rows(&mut rows, &self.order_by, self.default_table.as_deref());
        self.sorted = (!rows.is_empty()).then_some(rows);
        Ok(())
    }
}

impl PhysicalOperator for SortOperator {
    fn next(&mut self) -> FlatqResult<Option<Batch>> {
        if self.sorted.is_none() && !self.emitted {
            self.materialize()?;
        }

        if self.emitted {
            return Ok(None);
        }

        self.emitted = true;
        Ok(self.sorted.take())
    }

    fn reset(&mut self) -> FlatqResult<()> {
        self.sorted = None;
        self.emitted = false;
        self.input.reset()
    }
}

/// Stable multi-key sort. Missing fields sort as NULL.
pub fn sort_rows(rows: &mut [Row], order_by: &[OrderBySpec], default_table: Option<&str>) {
    if order_by.is_empty() {
        return;
    }
    rows.sort_by(|a, b| compare_rows(a, b, order_by, default_table));
}

fn compare_rows(a: &Row, b: &Row, order_by: &[OrderBySpec], default_table: Option<&str>) -> Ordering {
    for spec in order_by {
        let left = a.resolve(&spec.field, default_table).unwrap_or(&Value::Null);
        let right = b.resolve(&spec.field, default_table).unwrap_or(&Value::Null);
        let ord = left.sort_cmp(right);
        let ord = if spec.asc { ord } else { ord.reverse() };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::executor::operators::TableScanOperator;

    fn people() -> Vec<Row> {
        vec![
            Row::from_pairs([("name", "c"), ("dept", "B")]),
            Row::from_pairs([("name", "a"), ("dept", "A")]),
            Row::from_pairs([("name", "b"), ("dept", "B")]),
            Row::from_pairs([("name", "d"), ("dept", "A")]),
        ]
    }

    fn names(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r.get("name").unwrap().to_string()).collect()
    }

    #[test]
    fn ties_keep_input_order() {
        let mut rows = people();
        sort_rows(&mut rows, &[OrderBySpec::asc("dept")], None);
        assert_eq!(names(&rows), vec!["a", "d", "c", "b"]);
    }

    #[test]
    fn secondary_key_and_direction() {
        let mut rows = people();
        sort_rows(
            &mut rows,
            &[OrderBySpec::desc("dept"), OrderBySpec::asc("name")],
            None,
        );
        assert_eq!(names(&rows), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn text_values_are_not_coerced() {
        let mut rows = vec![
            Row::from_pairs([("name", "x"), ("n", "10")]),
            Row::from_pairs([("name", "y"), ("n", "9")]),
        ];
        sort_rows(&mut rows, &[OrderBySpec::asc("n")], None);
        assert_eq!(names(&rows), vec!["x", "y"]);
    }

    #[test]
    fn operator_emits_single_sorted_batch() {
        let scan = Box::new(TableScanOperator::new("t", people(), 1));
        let mut sort = SortOperator::new(scan, vec![OrderBySpec::asc("name")], None);
        let batch = sort.next().unwrap().unwrap();
        assert_eq!(names(&batch), vec!["a", "b", "c", "d"]);
        assert!(sort.next().unwrap().is_none());
    }
}
