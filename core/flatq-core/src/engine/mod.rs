//! Database Engine Module

pub mod config;
pub mod constructors;
pub mod database;
pub mod sql_interface;
pub mod types;

pub use config::EngineConfig;
pub use database::Database;
pub use types::{StatementAck, StatementKind, StatementOutcome};
