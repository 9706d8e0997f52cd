// Port Layer - Interfaces for external dependencies

pub mod activity_log;
pub mod execution_repository;
pub mod id_provider;
pub mod match_scorer;
pub mod result_repository;
pub mod search_spec_repository;
pub mod source_adapter;
pub mod time_provider;

// Re-exports
pub use activity_log::ActivityLog;
pub use execution_repository::ExecutionRepository;
pub use id_provider::IdProvider;
pub use match_scorer::{KeywordScorer, MatchScorer};
pub use result_repository::{ResultFilter, ResultRepository};
pub use search_spec_repository::SearchSpecRepository;
pub use source_adapter::{SourceAdapter, SourceAdapterError};
pub use time_provider::TimeProvider;
