//! Database Engine Types: statement results

use crate::storage::Row;
use serde::Serialize;

/// INSERT/DELETE 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementAck {
    pub message: String,
    pub rows_affected: usize,
}

impl StatementAck {
    pub fn new(message: impl Into<String>, rows_affected: usize) -> Self {
        Self {
            message: message.into(),
            rows_affected,
        }
    }
}

/// Result of [`Database::execute`](crate::Database::execute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatementOutcome {
    Rows(Vec<Row>),
    Ack(StatementAck),
}

/// Statement kind, decided by the leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Delete,
}

impl StatementKind {
    /// Classify by the first word, case-insensitively. `None` for anything else.
    pub fn detect(sql: &str) -> Option<Self> {
        let keyword = sql.split_whitespace().next()?;
        if keyword.eq_ignore_ascii_case("SELECT") {
            Some(StatementKind::Select)
        } else if keyword.eq_ignore_ascii_case("INSERT") {
            Some(StatementKind::Insert)
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            Some(StatementKind::Delete)
        } else {
            None
        }
    }
}
