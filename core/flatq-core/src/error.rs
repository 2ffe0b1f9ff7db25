//! Error types for the flatq query engine.
//!
//! All public APIs return `FlatqResult<T>`: no panics in library code.

use thiserror::Error;

/// Unified error type for all flatq operations.
#[derive(Debug, Error)]
pub enum FlatqError {
    /// Storage layer error (unwritable directory, malformed file, etc.)
    #[error("storage error: {0}")]
    Storage(String),

    /// Backing file for the table does not exist
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// CSV reader/writer error
    #[error("csv error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// SQL parsing error
    #[error("SQL parse error: {message}\nSQL: {sql}")]
    SqlParse { message: String, sql: String },

    /// Unsupported SQL feature
    #[error("SQL feature not supported: {feature}\nHint: {hint}")]
    SqlNotSupported { feature: String, hint: String },

    /// WHERE clause references a field the row does not carry
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// WHERE clause uses an operator outside the supported set
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// JOIN kind outside INNER/LEFT/RIGHT
    #[error("Unsupported JOIN type: {0}")]
    UnsupportedJoinType(String),

    /// Any failure raised while running a SELECT, wrapped once at the boundary
    #[error("query execution failed: {source}")]
    QueryExecution {
        #[source]
        source: Box<FlatqError>,
    },

    /// Engine configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for all flatq operations.
pub type FlatqResult<T> = Result<T, FlatqError>;

impl FlatqError {
    /// Wrap an error raised inside SELECT execution.
    ///
    /// Already-wrapped errors are returned unchanged so the context is only
    /// ever applied once.
    pub fn query_execution(err: FlatqError) -> Self {
        match err {
            wrapped @ FlatqError::QueryExecution { .. } => wrapped,
            other => FlatqError::QueryExecution {
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping the SELECT execution wrapper.
    pub fn root_cause(&self) -> &FlatqError {
        match self {
            FlatqError::QueryExecution { source } => source.root_cause(),
            other => other,
        }
    }

    /// Whether this error originates from the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(
            self.root_cause(),
            FlatqError::Storage(_)
                | FlatqError::TableNotFound(_)
                | FlatqError::Io { .. }
                | FlatqError::Csv { .. }
        )
    }
}

// From 구현들
impl From<serde_json::Error> for FlatqError {
    fn from(err: serde_json::Error) -> Self {
        FlatqError::Serialization(err.to_string())
    }
}

impl From<regex::Error> for FlatqError {
    fn from(err: regex::Error) -> Self {
        FlatqError::UnsupportedOperator(format!("LIKE pattern: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn error_display_storage() {
        let err = FlatqError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn error_display_table_not_found() {
        let err = FlatqError::TableNotFound("users".to_string());
        assert_eq!(err.to_string(), "table 'users' not found");
    }

    #[test]
    fn error_display_invalid_field() {
        let err = FlatqError::InvalidField("salary".to_string());
        assert_eq!(err.to_string(), "Invalid field: salary");
    }

    #[test]
    fn error_display_sql_parse() {
        let err = FlatqError::SqlParse {
            message: "unexpected token".to_string(),
            sql: "SELECT * FORM users".to_string(),
        };
        assert!(err.to_string().contains("SQL parse error"));
        assert!(err.to_string().contains("FORM users"));
    }

    #[test]
    fn query_execution_wraps_once() {
        let inner = FlatqError::UnsupportedOperator("~".to_string());
        let once = FlatqError::query_execution(inner);
        let twice = FlatqError::query_execution(once);

        assert!(twice.to_string().starts_with("query execution failed"));
        assert!(matches!(
            twice.root_cause(),
            FlatqError::UnsupportedOperator(op) if op == "~"
        ));
        let source = twice.source().unwrap();
        assert_eq!(source.to_string(), "Unsupported operator: ~");
    }

    #[test]
    fn storage_kind_survives_wrapping() {
        let err = FlatqError::query_execution(FlatqError::TableNotFound("t".to_string()));
        assert!(err.is_storage());
        assert!(!FlatqError::InvalidField("x".to_string()).is_storage());
    }
}
