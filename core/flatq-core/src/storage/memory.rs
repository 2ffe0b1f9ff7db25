//! In-memory table storage
//!
//! Same whole-table contract as the CSV backend, without touching disk.
//! Used by tests, benchmarks and `Database::open_in_memory`.

use crate::error::{FlatqError, FlatqResult};
use crate::storage::{Row, TableStorage, validate_table_name};
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory table storage
pub struct InMemoryStorage {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl InMemoryStorage {
    /// Create an empty in-memory storage
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Register (or replace) a table's rows.
    pub fn register_table(&self, table: &str, rows: Vec<Row>) {
        self.tables.write().insert(table.to_string(), rows);
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStorage for InMemoryStorage {
    fn load_table(&self, table: &str) -> FlatqResult<Vec<Row>> {
        self.tables
            .read()
            .get(table)
            .cloned()
            .ok_or_else(|| FlatqError::TableNotFound(table.to_string()))
    }

    fn save_table(&self, table: &str, rows: &[Row]) -> FlatqResult<()> {
        validate_table_name(table)?;
        self.tables.write().insert(table.to_string(), rows.to_vec());
        Ok(())
    }

    fn table_exists(&self, table: &str) -> bool {
        self.tables.read().contains_key(table)
    }

    fn table_names(&self) -> FlatqResult<Vec<String>> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
