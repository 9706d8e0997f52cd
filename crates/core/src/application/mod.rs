// Application Layer - engine services

pub mod activity;
pub mod cancel;
pub mod manager;
pub mod orchestrator;
pub mod registry;

pub use activity::ActivityRecorder;
pub use cancel::{cancel_channel, CancelHandle, CancelToken};
pub use manager::{ExecutionManager, StatusView};
pub use orchestrator::{AdapterSet, OrchestratorOutcome, SearchOrchestrator};
pub use registry::{CancelRequestOutcome, ExecutionRegistry, ProgressReporter};
