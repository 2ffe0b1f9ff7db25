//! CSV-backed table storage.
//!
//! Table `t` lives in `<root>/t.csv` with a header row. Every load reads the
//! complete file and every save rewrites it. Saves go through a temporary
//! file in the same directory followed by a rename, so a failed save leaves
//! the previous contents in place.

use crate::error::{FlatqError, FlatqResult};
use crate::storage::{Row, TableStorage, Value, column_union, validate_table_name};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// CSV 파일 기반 테이블 저장소: 테이블 하나당 파일 하나
#[derive(Debug, Clone)]
pub struct CsvStorage {
    root: PathBuf,
    delimiter: u8,
}

impl CsvStorage {
    /// Open a data directory, creating it if needed.
    pub fn open(root: impl AsRef<Path>) -> FlatqResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            delimiter: b',',
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the backing file for a table.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.csv"))
    }
}

impl TableStorage for CsvStorage {
    fn load_table(&self, table: &str) -> FlatqResult<Vec<Row>> {
        validate_table_name(table)?;
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(FlatqError::TableNotFound(table.to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row = Row::with_capacity(headers.len());
            for (idx, header) in headers.iter().enumerate() {
                let cell = record.get(idx).unwrap_or_default();
                row.insert(header, Value::Text(cell.to_string()));
            }
            rows.push(row);
        }

        debug!(table = %table, rows = rows.len(), "loaded csv table");
        Ok(rows)
    }

    fn save_table(&self, table: &str, rows: &[Row]) -> FlatqResult<()> {
        validate_table_name(table)?;
        let columns = column_union(rows);

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .delimiter(self.delimiter)
                .from_writer(tmp.as_file_mut());
            if !columns.is_empty() {
                writer.write_record(&columns)?;
                for row in rows {
                    writer.write_record(
                        columns
                            .iter()
                            .map(|col| row.get(col).map(Value::to_field).unwrap_or_default()),
                    )?;
                }
            }
            writer.flush()?;
        }
        tmp.persist(self.table_path(table))
            .map_err(|e| FlatqError::Io { source: e.error })?;

        debug!(table = %table, rows = rows.len(), columns = columns.len(), "saved csv table");
        Ok(())
    }

    fn table_exists(&self, table: &str) -> bool {
        validate_table_name(table).is_ok() && self.table_path(table).is_file()
    }

    fn table_names(&self) -> FlatqResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_missing_table_is_table_not_found() {
        let dir = tempdir().unwrap();
        let storage = CsvStorage::open(dir.path()).unwrap();
        let err = storage.load_table("ghost").unwrap_err();
        assert!(matches!(err, FlatqError::TableNotFound(name) if name == "ghost"));
    }

    #[test]
    fn save_then_load_preserves_order_and_text() {
        let dir = tempdir().unwrap();
        let storage = CsvStorage::open(dir.path()).unwrap();
        let rows = vec![
            Row::from_pairs([("id", "1"), ("name", "Alice, Jr.")]),
            Row::from_pairs([("id", "2"), ("name", "")]),
        ];
        storage.save_table("people", &rows).unwrap();

        let loaded = storage.load_table("people").unwrap();
        assert_eq!(loaded, rows);
        let names: Vec<&str> = loaded[0].field_names().collect();
        assert_eq!(names, vec!["id", "name"]);
    }

    #[test]
    fn save_writes_union_of_columns() {
        let dir = tempdir().unwrap();
        let storage = CsvStorage::open(dir.path()).unwrap();
        let rows = vec![
            Row::from_pairs([("id", "1")]),
            Row::from_pairs([("id", "2"), ("extra", "x")]),
        ];
        storage.save_table("t", &rows).unwrap();

        let text = fs::read_to_string(storage.table_path("t")).unwrap();
        assert_eq!(text, "id,extra\n1,\n2,x\n");
    }

    #[test]
    fn empty_table_round_trips_to_no_rows() {
        let dir = tempdir().unwrap();
        let storage = CsvStorage::open(dir.path()).unwrap();
        storage.save_table("empty", &[]).unwrap();
        assert!(storage.table_exists("empty"));
        assert!(storage.load_table("empty").unwrap().is_empty());
    }

    #[test]
    fn custom_delimiter() {
        let dir = tempdir().unwrap();
        let storage = CsvStorage::open(dir.path()).unwrap().with_delimiter(b';');
        fs::write(storage.table_path("semi"), "a;b\n1;2\n").unwrap();
        let rows = storage.load_table("semi").unwrap();
        assert_eq!(rows[0].get("b"), Some(&Value::from("2")));
    }

    #[test]
    fn table_names_lists_csv_files() {
        let dir = tempdir().unwrap();
        let storage = CsvStorage::open(dir.path()).unwrap();
        storage.save_table("b", &[Row::from_pairs([("x", "1")])]).unwrap();
        storage.save_table("a", &[Row::from_pairs([("x", "1")])]).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        assert_eq!(storage.table_names().unwrap(), vec!["a", "b"]);
    }
}
