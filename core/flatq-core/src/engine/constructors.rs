//! Database Constructors: factory methods for creating Database instances

use crate::engine::{Database, EngineConfig};
use crate::error::FlatqResult;
use crate::sql::planner::{PhysicalPlanner, QueryPlanner};
use crate::storage::{CsvStorage, InMemoryStorage, TableStorage};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

impl Database {
    /// 데이터 디렉토리를 열거나 생성합니다.
    ///
    /// 테이블 `t`는 `<path>/t.csv` 파일에 저장됩니다.
    ///
    /// # 예제
    ///
    /// ```rust
    /// use flatq_core::Database;
    ///
    /// # fn main() -> flatq_core::FlatqResult<()> {
    /// let dir = tempfile::tempdir()?;
    /// let db = Database::open(dir.path())?;
    /// assert!(db.storage().table_names()?.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(path))]
    pub fn open(path: &Path) -> FlatqResult<Self> {
        Self::open_with_config(EngineConfig::default().with_data_dir(path))
    }

    /// 설정으로 데이터베이스 열기
    #[instrument(skip(config), fields(data_dir = %config.data_dir.display()))]
    pub fn open_with_config(config: EngineConfig) -> FlatqResult<Self> {
        config.validate()?;
        info!("Opening database at {:?}", config.data_dir);
        let storage = CsvStorage::open(&config.data_dir)?.with_delimiter(config.delimiter_byte());
        let tables = storage.table_names()?;
        info!("Found {} tables", tables.len());
        Ok(Self::build(Arc::new(storage), config))
    }

    /// 인메모리 데이터베이스 생성 (테스트, 벤치마크용)
    pub fn open_in_memory() -> FlatqResult<Self> {
        Ok(Self::build(
            Arc::new(InMemoryStorage::new()),
            EngineConfig::default(),
        ))
    }

    /// Use a caller-provided storage backend.
    pub fn with_storage(storage: Arc<dyn TableStorage>, config: EngineConfig) -> FlatqResult<Self> {
        config.validate()?;
        Ok(Self::build(storage, config))
    }

    fn build(storage: Arc<dyn TableStorage>, config: EngineConfig) -> Self {
        Self {
            storage,
            physical_planner: PhysicalPlanner::new(config.batch_size),
            planner: QueryPlanner::new(),
            config,
        }
    }
}
