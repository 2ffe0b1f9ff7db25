//! Projection Operator: SELECT field selection

use crate::error::FlatqResult;
use crate::sql::executor::operators::{Batch, PhysicalOperator};
use crate::sql::planner::SelectField;
use crate::storage::{Row, Value};

/// Projection 연산자 (SELECT 필드 선택)
pub struct ProjectionOperator {
    input: Box<dyn PhysicalOperator>,
    fields: Vec<SelectField>,
    default_table: Option<String>,
    /// Tables whose `table.field` keys `*` expands to; empty means every key
    wildcard_tables: Vec<String>,
}

impl ProjectionOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        fields: Vec<SelectField>,
        default_table: Option<String>,
    ) -> Self {
        Self {
            input,
            fields,
            default_table,
            wildcard_tables: Vec::new(),
        }
    }

    /// Limit `*` to the qualified columns of the given tables.
    ///
    /// Join output also carries bare helper keys for WHERE / ORDER BY; those
    /// must not leak into `SELECT *`.
    pub fn with_wildcard_tables(mut self, tables: Vec<String>) -> Self {
        self.wildcard_tables = tables;
        self
    }
}

impl PhysicalOperator for ProjectionOperator {
    fn next(&mut self) -> FlatqResult<Option<Batch>> {
        match self.input.next()? {
            None => Ok(None),
            Some(batch) => {
                if self.wildcard_tables.is_empty()
                    && matches!(self.fields.as_slice(), [SelectField::Wildcard])
                {
                    // SELECT *: pass through all fields
                    return Ok(Some(batch));
                }
                Ok(Some(
                    batch
                        .iter()
                        .map(|row| {
                            project_row(
                                row,
                                &self.fields,
                                self.default_table.as_deref(),
                                &self.wildcard_tables,
                            )
                        })
                        .collect(),
                ))
            }
        }
    }

    fn reset(&mut self) -> FlatqResult<()> {
        self.input.reset()
    }
}

/// Keep only the selected fields, in select-list order. Missing fields are NULL.
///
/// `*` copies every key unless `wildcard_tables` is non-empty, in which case
/// only keys qualified by one of those tables are copied.
pub fn project_row(
    row: &Row,
    fields: &[SelectField],
    default_table: Option<&str>,
    wildcard_tables: &[String],
) -> Row {
    let mut out = Row::with_capacity(fields.len());
    for field in fields {
        match field {
            SelectField::Wildcard => {
                for (name, value) in row.iter() {
                    if wildcard_tables.is_empty() || qualified_by(name, wildcard_tables) {
                        out.insert(name, value.clone());
                    }
                }
            }
            other => {
                let label = other.label();
                let value = row
                    .resolve(label, default_table)
                    .cloned()
                    .unwrap_or(Value::Null);
                out.insert(label, value);
            }
        }
    }
    out
}

fn qualified_by(name: &str, tables: &[String]) -> bool {
    name.split_once('.')
        .is_some_and(|(table, _)| tables.iter().any(|t| t == table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::executor::drain;
    use crate::sql::executor::operators::TableScanOperator;

    #[test]
    fn projects_in_select_order_with_fallback() {
        let row = Row::from_pairs([("id", "1"), ("name", "Alice"), ("age", "30")]);
        let fields = vec![
            SelectField::parse("users.name"),
            SelectField::parse("id"),
            SelectField::parse("email"),
        ];
        let projected = project_row(&row, &fields, Some("users"), &[]);
        let pairs: Vec<(&str, String)> = projected.iter().map(|(k, v)| (k, v.to_string())).collect();
        assert_eq!(
            pairs,
            vec![
                ("users.name", "Alice".to_string()),
                ("id", "1".to_string()),
                ("email", "NULL".to_string()),
            ]
        );
    }

    #[test]
    fn wildcard_keeps_whole_row() {
        let row = Row::from_pairs([("id", "1"), ("name", "Alice")]);
        assert_eq!(project_row(&row, &[SelectField::Wildcard], None, &[]), row);
    }

    #[test]
    fn resolves_prefixed_join_output() {
        let row = Row::from_pairs([("users.id", "1"), ("orders.total", "9")]);
        let projected = project_row(&row, &[SelectField::parse("id")], Some("users"), &[]);
        assert_eq!(projected.get("id"), Some(&Value::from("1")));
    }

    #[test]
    fn join_wildcard_skips_helper_keys() {
        let row = Row::from_pairs([
            ("users.id", "1"),
            ("orders.total", "9"),
            ("total", "9"),
            ("name", "Alice"),
        ]);
        let tables = vec!["users".to_string(), "orders".to_string()];
        let projected = project_row(&row, &[SelectField::Wildcard], Some("users"), &tables);
        let keys: Vec<&str> = projected.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["users.id", "orders.total"]);
    }

    #[test]
    fn restricted_wildcard_does_not_pass_batches_through() {
        let rows = vec![Row::from_pairs([("a.x", "1"), ("x", "1")])];
        let scan = Box::new(TableScanOperator::new("a", rows, 4));
        let mut projection = ProjectionOperator::new(scan, vec![SelectField::Wildcard], None)
            .with_wildcard_tables(vec!["a".to_string(), "b".to_string()]);
        let out = drain(&mut projection).unwrap();
        assert_eq!(out[0].len(), 1);
        assert!(out[0].get("a.x").is_some());
    }
}
