//! # flatq: SQL over flat files
//!
//! flatq는 테이블 하나당 CSV 파일 하나로 저장된 데이터에 작은 SQL 방언을 실행하는
//! 인프로세스 쿼리 실행기입니다. 각 문장은 테이블 전체를 메모리로 읽어 처리합니다.
//!
//! ## 주요 특징
//!
//! - **SQL 지원**: SELECT / INSERT / DELETE, WHERE (AND), LIKE
//! - **JOIN**: INNER / LEFT / RIGHT 등가 조인 (테이블 두 개)
//! - **집계**: COUNT / SUM / AVG / MIN / MAX, GROUP BY
//! - **결과 정리**: ORDER BY, DISTINCT, LIMIT / OFFSET
//!
//! ## 빠른 시작
//!
//! ```rust
//! use flatq_core::Database;
//!
//! # fn main() -> flatq_core::FlatqResult<()> {
//! let dir = tempfile::tempdir()?;
//! std::fs::write(dir.path().join("employees.csv"), "name,dept,salary\na,A,100\nb,A,200\nc,B,50\n")?;
//!
//! let db = Database::open(dir.path())?;
//! let rows = db.execute_select("SELECT dept, COUNT(*), SUM(salary) FROM employees GROUP BY dept")?;
//! assert_eq!(rows.len(), 2);
//!
//! db.execute_delete("DELETE FROM employees WHERE salary > 150")?;
//! assert_eq!(db.execute_select("SELECT * FROM employees")?.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## SQL 실행 파이프라인
//!
//! ```text
//! SQL 문자열 → SqlParser → AST → QueryPlanner → QueryDescription
//!          → PhysicalPlanner → 연산자 트리 (Volcano) → Vec<Row>
//! ```
//!
//! ## 모듈 구조
//!
//! - [`engine`]: 데이터베이스 엔진 ([`Database`]), 설정
//! - [`sql`]: SQL 파서, 플래너, 실행기
//! - [`storage`]: 테이블 저장소 (CSV, 인메모리)

pub mod engine;
pub mod error;
pub mod sql;
pub mod storage;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use engine::{Database, EngineConfig, StatementAck, StatementOutcome};
pub use error::{FlatqError, FlatqResult};
pub use storage::{Row, Value};
