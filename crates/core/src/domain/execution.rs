// Execution Domain Model - one run of a SearchSpec

use serde::{Deserialize, Serialize};

use crate::domain::search_spec::SearchId;

/// Execution ID (UUID v4)
pub type ExecutionId = String;

/// Execution status
///
/// Transitions are monotonic along QUEUED -> RUNNING -> {COMPLETED | FAILED
/// | CANCELLED}. CANCELLING is a transient overlay on RUNNING (exposed by
/// status queries while a cancellation request is being observed), not a
/// terminal state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Queued,
    Running,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Queued => write!(f, "queued"),
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Cancelling => write!(f, "cancelling"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
            ExecutionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(ExecutionStatus::Queued),
            "running" => Ok(ExecutionStatus::Running),
            "cancelling" => Ok(ExecutionStatus::Cancelling),
            "completed" => Ok(ExecutionStatus::Completed),
            "failed" => Ok(ExecutionStatus::Failed),
            "cancelled" => Ok(ExecutionStatus::Cancelled),
            other => Err(format!("unknown execution status: {}", other)),
        }
    }
}

/// Execution Entity - the durable record of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub search_id: SearchId,
    pub status: ExecutionStatus,

    pub started_at: i64,           // epoch ms
    pub completed_at: Option<i64>, // None while in flight

    pub total_results_found: i64,
    pub new_results: i64,
    pub duplicate_results: i64,

    pub error_message: Option<String>,
    pub execution_time_ms: Option<i64>,
}

impl Execution {
    /// Create a new execution already in RUNNING state.
    ///
    /// `start` accepts a run by persisting it as RUNNING; there is no
    /// durable QUEUED phase in this engine.
    pub fn new_running(
        id: impl Into<String>,
        search_id: impl Into<String>,
        started_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            search_id: search_id.into(),
            status: ExecutionStatus::Running,
            started_at,
            completed_at: None,
            total_results_found: 0,
            new_results: 0,
            duplicate_results: 0,
            error_message: None,
            execution_time_ms: None,
        }
    }

    fn finish(&mut self, status: ExecutionStatus, now_millis: i64) {
        self.status = status;
        self.completed_at = Some(now_millis);
        self.execution_time_ms = Some(now_millis - self.started_at);
    }

    fn ensure_running(&self, to: &str) -> crate::domain::error::Result<()> {
        if self.status != ExecutionStatus::Running {
            return Err(crate::domain::error::DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    /// Transition to COMPLETED with final counters.
    pub fn complete(
        &mut self,
        now_millis: i64,
        total: i64,
        new: i64,
        duplicates: i64,
    ) -> crate::domain::error::Result<()> {
        self.ensure_running("completed")?;
        self.total_results_found = total;
        self.new_results = new;
        self.duplicate_results = duplicates;
        self.finish(ExecutionStatus::Completed, now_millis);
        Ok(())
    }

    /// Transition to FAILED, capturing the error.
    pub fn fail(
        &mut self,
        now_millis: i64,
        error: impl Into<String>,
    ) -> crate::domain::error::Result<()> {
        self.ensure_running("failed")?;
        self.error_message = Some(error.into());
        self.finish(ExecutionStatus::Failed, now_millis);
        Ok(())
    }

    /// Transition to CANCELLED. Partial counters are retained, not rolled
    /// back.
    pub fn cancel(
        &mut self,
        now_millis: i64,
        total: i64,
        new: i64,
        duplicates: i64,
    ) -> crate::domain::error::Result<()> {
        self.ensure_running("cancelled")?;
        self.total_results_found = total;
        self.new_results = new;
        self.duplicate_results = duplicates;
        self.finish(ExecutionStatus::Cancelled, now_millis);
        Ok(())
    }
}
