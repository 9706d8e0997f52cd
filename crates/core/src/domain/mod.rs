// Domain Layer - entities and value types

pub mod activity;
pub mod error;
pub mod execution;
pub mod progress;
pub mod raw;
pub mod result_record;
pub mod search_spec;

pub use activity::{ActivityLogEntry, Severity};
pub use error::DomainError;
pub use execution::{Execution, ExecutionId, ExecutionStatus};
pub use progress::ProgressSnapshot;
pub use raw::RawListing;
pub use result_record::{CompensationRange, ResultRecord, ReviewState};
pub use search_spec::{DelayPolicy, SearchId, SearchParams, SearchSpec};
