//! Storage module: flat-file tables.
//!
//! All storage engines implement the [`TableStorage`] trait.
//! The SQL layer depends only on this trait, never on a concrete backend.

pub mod csv_store;
pub mod memory;
pub mod row;

pub use csv_store::CsvStorage;
pub use memory::InMemoryStorage;
pub use row::{Row, Value};

use crate::error::{FlatqError, FlatqResult};

/// Whole-table storage interface.
///
/// # Contract
///
/// - `load_table`: Returns every row of the table in stored order; fails with
///   `TableNotFound` when the backing resource does not exist.
/// - `save_table`: Replaces the full contents of the table. The persisted
///   column set is the union of the rows' fields in first-seen order.
/// - `table_exists`: Never errors.
/// - `table_names`: Returns all table names, sorted.
pub trait TableStorage: Send + Sync {
    /// Load all rows of a table.
    fn load_table(&self, table: &str) -> FlatqResult<Vec<Row>>;

    /// Overwrite a table with the given rows.
    fn save_table(&self, table: &str, rows: &[Row]) -> FlatqResult<()>;

    /// Whether the table has a backing resource.
    fn table_exists(&self, table: &str) -> bool;

    /// List table names.
    fn table_names(&self) -> FlatqResult<Vec<String>>;
}

/// Reject names that would escape the data directory or produce an empty file name.
pub(crate) fn validate_table_name(table: &str) -> FlatqResult<()> {
    let bad = table.is_empty()
        || table.contains(['/', '\\'])
        || table == "."
        || table == ".."
        || table.contains('\0');
    if bad {
        return Err(FlatqError::Storage(format!("invalid table name '{table}'")));
    }
    Ok(())
}

/// Union of the rows' field names in first-seen order.
pub(crate) fn column_union(rows: &[Row]) -> Vec<String> {
    let mut columns = indexmap::IndexSet::new();
    for row in rows {
        for name in row.field_names() {
            if !columns.contains(name) {
                columns.insert(name.to_string());
            }
        }
    }
    columns.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_union_keeps_first_seen_order() {
        let rows = vec![
            Row::from_pairs([("id", "1"), ("name", "a")]),
            Row::from_pairs([("name", "b"), ("age", "3")]),
        ];
        assert_eq!(column_union(&rows), vec!["id", "name", "age"]);
    }

    #[test]
    fn table_names_cannot_escape() {
        assert!(validate_table_name("users").is_ok());
        assert!(validate_table_name("../etc/passwd").is_err());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("..").is_err());
    }
}
