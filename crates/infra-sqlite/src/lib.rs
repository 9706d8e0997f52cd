// Jobscout Infrastructure - SQLite Adapter
// Implements: SearchSpecRepository, ExecutionRepository, ResultRepository,
// ActivityLog

mod activity_log;
mod connection;
mod error;
mod execution_repository;
mod migration;
mod result_repository;
mod spec_repository;

pub use activity_log::SqliteActivityLog;
pub use connection::create_pool;
pub use execution_repository::SqliteExecutionRepository;
pub use migration::run_migrations;
pub use result_repository::SqliteResultRepository;
pub use spec_repository::SqliteSearchSpecRepository;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
