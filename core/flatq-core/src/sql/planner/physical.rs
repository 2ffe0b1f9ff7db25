//! PhysicalPlanner 구현
//!
//! QueryDescription + 로드된 행 → 물리 연산자 트리 변환

use super::types::*;
use crate::error::FlatqResult;
use crate::sql::executor::operators::{
    DistinctOperator, FilterOperator, HashAggregateOperator, JoinContext, JoinOperator,
    LimitOperator, PhysicalOperator, ProjectionOperator, SortOperator, TableScanOperator,
};
use crate::storage::Row;
use tracing::debug;

/// 물리 플랜 빌더: Volcano 연산자 트리 생성
#[derive(Debug, Clone)]
pub struct PhysicalPlanner {
    batch_size: usize,
}

impl PhysicalPlanner {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn scan(&self, table: &str, rows: Vec<Row>) -> Box<dyn PhysicalOperator> {
        Box::new(TableScanOperator::new(table, rows, self.batch_size))
    }

    /// Build the SELECT pipeline.
    ///
    /// scan → join → filter, then one of:
    /// global aggregate; grouped aggregate → sort → limit;
    /// sort → project → distinct → limit.
    pub fn plan_select(
        &self,
        query: &QueryDescription,
        main_rows: Vec<Row>,
        join_rows: Option<Vec<Row>>,
    ) -> FlatqResult<Box<dyn PhysicalOperator>> {
        let default_table = Some(query.table.clone());
        let mut plan = self.scan(&query.table, main_rows);
        let mut wildcard_tables = Vec::new();

        if let Some(join) = &query.join {
            wildcard_tables = vec![query.table.clone(), join.table.clone()];
            let right = self.scan(&join.table, join_rows.unwrap_or_default());
            let context = JoinContext {
                main_table: query.table.clone(),
                join_table: join.table.clone(),
                condition: join.condition.clone(),
                fields: query.join_fields(),
                wildcard: query.has_wildcard(),
            };
            plan = Box::new(JoinOperator::new(plan, right, join.join_type, context));
        }

        if !query.where_clauses.is_empty() {
            plan = Box::new(FilterOperator::new(
                plan,
                &query.where_clauses,
                default_table.clone(),
            )?);
        }

        if query.has_aggregate_without_group_by() {
            debug!(table = %query.table, "planned global aggregate");
            return Ok(Box::new(HashAggregateOperator::new(
                plan,
                Vec::new(),
                query.aggregates(),
                default_table,
            )));
        }

        if let Some(group_by) = &query.group_by {
            debug!(table = %query.table, groups = ?group_by, "planned grouped aggregate");
            plan = Box::new(HashAggregateOperator::new(
                plan,
                group_by.clone(),
                query.aggregates(),
                default_table.clone(),
            ));
            plan = self.plan_sort(plan, query, default_table);
            return Ok(self.plan_limit(plan, query));
        }

        plan = self.plan_sort(plan, query, default_table.clone());
        plan = Box::new(
            ProjectionOperator::new(plan, query.fields.clone(), default_table)
                .with_wildcard_tables(wildcard_tables),
        );
        if query.distinct {
            plan = Box::new(DistinctOperator::new(plan));
        }
        Ok(self.plan_limit(plan, query))
    }

    /// DELETE keeps the rows that fail the WHERE clauses.
    pub fn plan_delete(
        &self,
        query: &DeleteQuery,
        rows: Vec<Row>,
    ) -> FlatqResult<Box<dyn PhysicalOperator>> {
        let scan = self.scan(&query.table, rows);
        Ok(Box::new(FilterOperator::rejecting(
            scan,
            &query.where_clauses,
            Some(query.table.clone()),
        )?))
    }

    fn plan_sort(
        &self,
        plan: Box<dyn PhysicalOperator>,
        query: &QueryDescription,
        default_table: Option<String>,
    ) -> Box<dyn PhysicalOperator> {
        match &query.order_by {
            Some(order_by) if !order_by.is_empty() => {
                Box::new(SortOperator::new(plan, order_by.clone(), default_table))
            }
            _ => plan,
        }
    }

    fn plan_limit(
        &self,
        plan: Box<dyn PhysicalOperator>,
        query: &QueryDescription,
    ) -> Box<dyn PhysicalOperator> {
        if query.limit.is_none() && query.offset == 0 {
            return plan;
        }
        Box::new(LimitOperator::new(plan, query.limit, query.offset))
    }
}

impl Default for PhysicalPlanner {
    fn default() -> Self {
        Self::new(1024)
    }
}
