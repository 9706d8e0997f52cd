// Execution Registry - in-memory map of live executions
//
// The only mutable shared state within the engine process. Owned by one
// ExecutionManager instance and passed by handle; no process globals.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::application::cancel::CancelHandle;
use crate::domain::{ExecutionId, ProgressSnapshot, SearchId};
use crate::error::{AppError, Result};

/// Live tracking entry for one running execution
struct LiveExecution {
    search_id: SearchId,
    cancel: CancelHandle,
    progress: ProgressSnapshot,
    cancelling: bool,
    started_at: i64, // epoch ms
}

/// Outcome of a cancellation request against the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelRequestOutcome {
    /// Flag flipped and token signalled
    Requested,
    /// Already cancelling; request was a no-op
    AlreadyInProgress,
}

/// Read-only view of a live entry, for status queries
#[derive(Debug, Clone)]
pub struct LiveSnapshot {
    pub search_id: SearchId,
    pub progress: ProgressSnapshot,
    pub cancelling: bool,
    pub started_at: i64,
}

/// Concurrency-safe map of live executions keyed by execution id
pub struct ExecutionRegistry {
    live: RwLock<HashMap<ExecutionId, LiveExecution>>,
}

impl ExecutionRegistry {
    pub fn new() -> Self {
        Self {
            live: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new live execution, atomically enforcing the
    /// one-running-execution-per-spec invariant.
    pub async fn try_register(
        &self,
        execution_id: &ExecutionId,
        search_id: &SearchId,
        cancel: CancelHandle,
        started_at: i64,
    ) -> Result<()> {
        let mut live = self.live.write().await;

        if live.values().any(|e| &e.search_id == search_id) {
            return Err(AppError::Conflict(format!(
                "search {} already has a running execution",
                search_id
            )));
        }

        live.insert(
            execution_id.clone(),
            LiveExecution {
                search_id: search_id.clone(),
                cancel,
                progress: ProgressSnapshot::starting(),
                cancelling: false,
                started_at,
            },
        );
        Ok(())
    }

    /// Remove a terminated execution (the durable record becomes the only
    /// view of it)
    pub async fn remove(&self, execution_id: &ExecutionId) {
        self.live.write().await.remove(execution_id);
    }

    pub async fn is_search_running(&self, search_id: &SearchId) -> bool {
        self.live
            .read()
            .await
            .values()
            .any(|e| &e.search_id == search_id)
    }

    /// Overwrite the progress snapshot for a live execution
    pub async fn set_progress(&self, execution_id: &ExecutionId, progress: ProgressSnapshot) {
        if let Some(entry) = self.live.write().await.get_mut(execution_id) {
            entry.progress = progress;
        }
    }

    pub async fn snapshot(&self, execution_id: &ExecutionId) -> Option<LiveSnapshot> {
        self.live
            .read()
            .await
            .get(execution_id)
            .map(|e| LiveSnapshot {
                search_id: e.search_id.clone(),
                progress: e.progress.clone(),
                cancelling: e.cancelling,
                started_at: e.started_at,
            })
    }

    /// Flip the cancelling flag and signal the token.
    ///
    /// Returns NotFound when the execution has no live entry (already
    /// terminal or unknown).
    pub async fn request_cancel(
        &self,
        execution_id: &ExecutionId,
    ) -> Result<CancelRequestOutcome> {
        let mut live = self.live.write().await;
        let entry = live.get_mut(execution_id).ok_or_else(|| {
            AppError::NotFound(format!("no running execution {}", execution_id))
        })?;

        if entry.cancelling {
            return Ok(CancelRequestOutcome::AlreadyInProgress);
        }

        entry.cancelling = true;
        entry.cancel.cancel();
        Ok(CancelRequestOutcome::Requested)
    }

    pub async fn live_count(&self) -> usize {
        self.live.read().await.len()
    }

    /// Ids of all live executions, for shutdown-time cancellation
    pub async fn live_ids(&self) -> Vec<ExecutionId> {
        self.live.read().await.keys().cloned().collect()
    }
}

impl Default for ExecutionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for orchestrator-side progress updates to one registry entry
#[derive(Clone)]
pub struct ProgressReporter {
    registry: Arc<ExecutionRegistry>,
    execution_id: ExecutionId,
}

impl ProgressReporter {
    pub fn new(registry: Arc<ExecutionRegistry>, execution_id: ExecutionId) -> Self {
        Self {
            registry,
            execution_id,
        }
    }

    pub async fn update(&self, progress: ProgressSnapshot) {
        self.registry.set_progress(&self.execution_id, progress).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cancel::cancel_channel;

    #[tokio::test]
    async fn test_try_register_rejects_second_execution_for_same_search() {
        let registry = ExecutionRegistry::new();
        let (h1, _t1) = cancel_channel();
        let (h2, _t2) = cancel_channel();

        registry
            .try_register(&"exec-1".to_string(), &"spec-1".to_string(), h1, 1000)
            .await
            .unwrap();

        let err = registry
            .try_register(&"exec-2".to_string(), &"spec-1".to_string(), h2, 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_cancel_request_is_idempotent() {
        let registry = ExecutionRegistry::new();
        let (handle, token) = cancel_channel();
        registry
            .try_register(&"exec-1".to_string(), &"spec-1".to_string(), handle, 1000)
            .await
            .unwrap();

        let first = registry.request_cancel(&"exec-1".to_string()).await.unwrap();
        assert_eq!(first, CancelRequestOutcome::Requested);
        assert!(token.is_cancelled());

        let second = registry.request_cancel(&"exec-1".to_string()).await.unwrap();
        assert_eq!(second, CancelRequestOutcome::AlreadyInProgress);
    }

    #[tokio::test]
    async fn test_cancel_request_on_unknown_execution_is_not_found() {
        let registry = ExecutionRegistry::new();
        let err = registry
            .request_cancel(&"exec-missing".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_frees_the_search_for_a_new_run() {
        let registry = ExecutionRegistry::new();
        let (h1, _t1) = cancel_channel();
        registry
            .try_register(&"exec-1".to_string(), &"spec-1".to_string(), h1, 1000)
            .await
            .unwrap();

        registry.remove(&"exec-1".to_string()).await;
        assert!(!registry.is_search_running(&"spec-1".to_string()).await);

        let (h2, _t2) = cancel_channel();
        assert!(registry
            .try_register(&"exec-2".to_string(), &"spec-1".to_string(), h2, 2000)
            .await
            .is_ok());
    }
}
