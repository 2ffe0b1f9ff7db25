//! Database struct definition: the core data structure

use crate::engine::EngineConfig;
use crate::sql::planner::{PhysicalPlanner, QueryPlanner};
use crate::storage::TableStorage;
use std::sync::Arc;

/// flatq 데이터베이스 엔진
///
/// 테이블 하나당 파일 하나인 저장소 위에서 SQL 문을 실행합니다.
/// 상태는 저장소에만 있고, 각 문장은 테이블 전체를 새로 읽습니다.
///
/// # 데이터 흐름
///
/// - **SELECT**: load → join → filter → aggregate / sort → project → distinct → limit
/// - **INSERT**: load → append → save
/// - **DELETE**: load → keep non-matching rows → save
///
/// # 예제
///
/// ```rust
/// use flatq_core::storage::InMemoryStorage;
/// use flatq_core::{Database, EngineConfig};
/// use std::sync::Arc;
///
/// # fn main() -> flatq_core::FlatqResult<()> {
/// let storage = Arc::new(InMemoryStorage::new());
/// storage.register_table("users", Vec::new());
/// let db = Database::with_storage(storage, EngineConfig::default())?;
/// db.execute_insert("INSERT INTO users (id, name) VALUES (1, 'Alice')")?;
/// let rows = db.execute_select("SELECT name FROM users WHERE id = 1")?;
/// assert_eq!(rows.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Database {
    /// Table storage backend (CSV directory or in-memory)
    pub(crate) storage: Arc<dyn TableStorage>,

    pub(crate) config: EngineConfig,

    /// SQL text → query descriptions
    pub(crate) planner: QueryPlanner,

    /// Query descriptions → operator trees
    pub(crate) physical_planner: PhysicalPlanner,
}

impl Database {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn TableStorage> {
        &self.storage
    }
}
