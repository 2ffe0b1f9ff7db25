// SQL 모듈 진입점
pub mod executor;
pub mod parser;
pub mod planner;

pub use executor::{
    DistinctOperator, FilterOperator, HashAggregateOperator, JoinOperator, LimitOperator,
    PhysicalOperator, Predicate, ProjectionOperator, SortOperator, TableScanOperator, evaluate,
};
pub use parser::SqlParser;
pub use planner::{
    AggregateFunction, AggregateSpec, CompareOp, DeleteQuery, InsertQuery, JoinCondition,
    JoinSpec, JoinType, OrderBySpec, PhysicalPlanner, QueryDescription, QueryPlanner,
    SelectField, WhereClause, parse_delete_query, parse_insert_query, parse_select_query,
};
