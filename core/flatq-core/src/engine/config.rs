//! Engine configuration
//!
//! Defaults, then `FLATQ_*` environment variables or a JSON file.

use crate::error::{FlatqError, FlatqResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_DATA_DIR: &str = "FLATQ_DATA_DIR";
pub const ENV_BATCH_SIZE: &str = "FLATQ_BATCH_SIZE";
pub const ENV_DELIMITER: &str = "FLATQ_DELIMITER";

/// 엔진 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding `<table>.csv` files
    pub data_dir: PathBuf,
    /// Rows per batch emitted by the table scan
    pub batch_size: usize,
    /// CSV field delimiter
    pub delimiter: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            batch_size: 1024,
            delimiter: ',',
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 환경 변수에서 로드 (설정되지 않은 값은 기본값)
    pub fn from_env() -> FlatqResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FlatqResult<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup(ENV_BATCH_SIZE) {
            config.batch_size = size.trim().parse().map_err(|_| {
                FlatqError::Config(format!("{ENV_BATCH_SIZE} must be an integer, got '{size}'"))
            })?;
        }
        if let Some(delim) = lookup(ENV_DELIMITER) {
            let mut chars = delim.chars();
            config.delimiter = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(FlatqError::Config(format!(
                        "{ENV_DELIMITER} must be a single character, got '{delim}'"
                    )));
                }
            };
        }
        config.validate()?;
        Ok(config)
    }

    /// 파일에서 로드
    pub fn load_from_file(path: impl AsRef<Path>) -> FlatqResult<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// 파일에 저장
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> FlatqResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> FlatqResult<()> {
        if self.batch_size == 0 {
            return Err(FlatqError::Config("batch_size must be at least 1".to_string()));
        }
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(FlatqError::Config(format!(
                "delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Delimiter as the byte the csv crate expects.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        u8::try_from(self.delimiter).unwrap_or(b',')
    }
}
