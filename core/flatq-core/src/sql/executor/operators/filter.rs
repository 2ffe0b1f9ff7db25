//! Filter Operator: WHERE clause evaluation

use crate::error::FlatqResult;
use crate::sql::executor::expr::{Predicate, compile_all, matches_all};
use crate::sql::executor::operators::{Batch, PhysicalOperator};
use crate::sql::planner::WhereClause;

/// 필터 연산자 (WHERE 조건): 모든 절이 참인 행만 통과
///
/// Clauses are compiled when the operator is built, so LIKE patterns are
/// translated once per query rather than once per row.
pub struct FilterOperator {
    input: Box<dyn PhysicalOperator>,
    predicates: Vec<Predicate>,
    /// Table whose name may qualify bare row keys
    default_table: Option<String>,
    /// DELETE keeps the rows that do NOT match
    keep_matching: bool,
}

impl FilterOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        clauses: &[WhereClause],
        default_table: Option<String>,
    ) -> FlatqResult<Self> {
        Ok(Self {
            input,
            predicates: compile_all(clauses)?,
            default_table,
            keep_matching: true,
        })
    }

    /// Keep only rows that fail the clause list.
    pub fn rejecting(
        input: Box<dyn PhysicalOperator>,
        clauses: &[WhereClause],
        default_table: Option<String>,
    ) -> FlatqResult<Self> {
        Ok(Self {
            keep_matching: false,
            ..Self::new(input, clauses, default_table)?
        })
    }
}

impl PhysicalOperator for FilterOperator {
    fn next(&mut self) -> FlatqResult<Option<Batch>> {
        let default_table = self.default_table.as_deref();
        loop {
            match self.input.next()? {
                None => return Ok(None),
                Some(batch) => {
                    if batch.is_empty() {
                        continue;
                    }
                    let mut filtered = Vec::with_capacity(batch.len());
                    for row in batch {
                        if matches_all(&row, &self.predicates, default_table)? == self.keep_matching {
                            filtered.push(row);
                        }
                    }
                    if !filtered.is_empty() {
                        return Ok(Some(filtered));
                    }
                    // If all rows filtered out, try next batch
                }
            }
        }
    }

    fn reset(&mut self) -> FlatqResult<()> {
        self.input.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlatqError;
    use crate::sql::executor::drain;
    use crate::sql::executor::operators::TableScanOperator;
    use crate::storage::Row;

    fn scan() -> Box<dyn PhysicalOperator> {
        let rows = (1..=6)
            .map(|i| Row::from_pairs([("n", i.to_string())]))
            .collect();
        Box::new(TableScanOperator::new("t", rows, 2))
    }

    #[test]
    fn keeps_matching_rows_across_batches() {
        let clauses = vec![WhereClause::new("n", ">", "4").unwrap()];
        let mut filter = FilterOperator::new(scan(), &clauses, None).unwrap();
        let out = drain(&mut filter).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn rejecting_is_complement() {
        let clauses = vec![WhereClause::new("n", ">", "4").unwrap()];
        let mut filter = FilterOperator::rejecting(scan(), &clauses, None).unwrap();
        assert_eq!(drain(&mut filter).unwrap().len(), 4);
    }

    #[test]
    fn propagates_invalid_field() {
        let clauses = vec![WhereClause::new("missing", "=", "1").unwrap()];
        let mut filter = FilterOperator::new(scan(), &clauses, None).unwrap();
        assert!(matches!(
            drain(&mut filter),
            Err(FlatqError::InvalidField(_))
        ));
    }

    #[test]
    fn qualified_clause_uses_default_table() {
        let clauses = vec![WhereClause::new("t.n", "<", "3").unwrap()];
        let mut filter = FilterOperator::new(scan(), &clauses, Some("t".to_string())).unwrap();
        assert_eq!(drain(&mut filter).unwrap().len(), 2);

        let mut filter = FilterOperator::new(scan(), &clauses, Some("u".to_string())).unwrap();
        assert!(matches!(
            drain(&mut filter),
            Err(FlatqError::InvalidField(f)) if f == "t.n"
        ));
    }
}
