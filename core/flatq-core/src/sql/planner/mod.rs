//! SQL 플래너 모듈
//!
//! 쿼리 설명(QueryDescription)과 물리 연산자 트리를 생성합니다.

pub mod logical;
pub mod physical;
pub mod types;

// Re-export main types
pub use logical::{QueryPlanner, parse_delete_query, parse_insert_query, parse_select_query};
pub use physical::PhysicalPlanner;
pub use types::*;
