//! SQL Execution Pipeline: SQL statement execution methods

use crate::engine::types::{StatementAck, StatementKind, StatementOutcome};
use crate::engine::Database;
use crate::error::{FlatqError, FlatqResult};
use crate::sql::executor::drain;
use crate::sql::planner::{DeleteQuery, InsertQuery, QueryDescription};
use crate::storage::Row;
use tracing::{debug, info, instrument};

pub const INSERT_ACK: &str = "Insertion successful.";
pub const DELETE_ACK: &str = "Deletion successful.";

impl Database {
    /// SELECT 실행: 결과 행 반환
    ///
    /// Every failure is reported as `QueryExecution`; the underlying error is
    /// its `source()` (see [`FlatqError::root_cause`]).
    #[instrument(skip(self))]
    pub fn execute_select(&self, sql: &str) -> FlatqResult<Vec<Row>> {
        let query = self
            .planner
            .plan_select(sql)
            .map_err(FlatqError::query_execution)?;
        self.execute_query(&query)
    }

    /// Run an already-parsed SELECT description.
    pub fn execute_query(&self, query: &QueryDescription) -> FlatqResult<Vec<Row>> {
        self.run_query(query).map_err(FlatqError::query_execution)
    }

    fn run_query(&self, query: &QueryDescription) -> FlatqResult<Vec<Row>> {
        let main_rows = self.storage.load_table(&query.table)?;
        let join_rows = match &query.join {
            Some(join) => Some(self.storage.load_table(&join.table)?),
            None => None,
        };

        let mut plan = self
            .physical_planner
            .plan_select(query, main_rows, join_rows)?;
        let rows = drain(plan.as_mut())?;
        debug!(table = %query.table, rows = rows.len(), "select finished");
        Ok(rows)
    }

    /// INSERT 실행: 한 행 추가 후 테이블 전체 저장
    #[instrument(skip(self))]
    pub fn execute_insert(&self, sql: &str) -> FlatqResult<StatementAck> {
        let insert = self.planner.plan_insert(sql)?;
        self.apply_insert(&insert)
    }

    /// Append one row built from `(columns, values)`. No duplicate or schema check.
    pub fn apply_insert(&self, insert: &InsertQuery) -> FlatqResult<StatementAck> {
        if insert.columns.len() != insert.values.len() {
            return Err(FlatqError::SqlParse {
                message: format!(
                    "INSERT has {} columns but {} values",
                    insert.columns.len(),
                    insert.values.len()
                ),
                sql: format!("INSERT INTO {}", insert.table),
            });
        }

        let mut rows = self.storage.load_table(&insert.table)?;
        let row: Row = insert
            .columns
            .iter()
            .cloned()
            .zip(insert.values.iter().cloned())
            .collect();
        rows.push(row);
        self.storage.save_table(&insert.table, &rows)?;

        info!(table = %insert.table, rows = rows.len(), "row inserted");
        Ok(StatementAck::new(INSERT_ACK, 1))
    }

    /// DELETE 실행: WHERE를 만족하지 않는 행만 남기고 저장
    #[instrument(skip(self))]
    pub fn execute_delete(&self, sql: &str) -> FlatqResult<StatementAck> {
        let delete = self.planner.plan_delete(sql)?;
        self.apply_delete(&delete)
    }

    /// Without WHERE clauses the table is cleared.
    pub fn apply_delete(&self, delete: &DeleteQuery) -> FlatqResult<StatementAck> {
        let rows = self.storage.load_table(&delete.table)?;
        let before = rows.len();

        let kept = if delete.where_clauses.is_empty() {
            Vec::new()
        } else {
            let mut plan = self.physical_planner.plan_delete(delete, rows)?;
            drain(plan.as_mut())?
        };
        self.storage.save_table(&delete.table, &kept)?;

        let removed = before - kept.len();
        info!(table = %delete.table, removed, remaining = kept.len(), "rows deleted");
        Ok(StatementAck::new(DELETE_ACK, removed))
    }

    /// Dispatch on the leading keyword (SELECT / INSERT / DELETE).
    pub fn execute(&self, sql: &str) -> FlatqResult<StatementOutcome> {
        match StatementKind::detect(sql) {
            Some(StatementKind::Select) => self.execute_select(sql).map(StatementOutcome::Rows),
            Some(StatementKind::Insert) => self.execute_insert(sql).map(StatementOutcome::Ack),
            Some(StatementKind::Delete) => self.execute_delete(sql).map(StatementOutcome::Ack),
            None => Err(FlatqError::SqlNotSupported {
                feature: sql.split_whitespace().next().unwrap_or_default().to_uppercase(),
                hint: "Supported statements: SELECT, INSERT, DELETE".to_string(),
            }),
        }
    }
}
