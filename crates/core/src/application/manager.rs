// Execution Manager - owns the lifecycle of search executions
//
// The only mutation path for Execution records: accepts `start`, tracks the
// live run in the registry, and reconciles the terminal record when the
// orchestrator returns.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::application::activity::ActivityRecorder;
use crate::application::cancel::cancel_channel;
use crate::application::orchestrator::{OrchestratorOutcome, SearchOrchestrator};
use crate::application::registry::{CancelRequestOutcome, ExecutionRegistry, ProgressReporter};
use crate::domain::{Execution, ExecutionId, ExecutionStatus, ProgressSnapshot, SearchId, SearchSpec};
use crate::error::{AppError, Result};
use crate::port::{ExecutionRepository, IdProvider, SearchSpecRepository, TimeProvider};

/// Status view returned by `get_status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub execution_id: ExecutionId,
    pub status: ExecutionStatus,
    pub progress: Option<ProgressSnapshot>,
    pub uptime_ms: i64,
    pub error_message: Option<String>,
    pub total_results_found: Option<i64>,
}

/// Owns the full lifecycle of executions and the live registry
pub struct ExecutionManager {
    registry: Arc<ExecutionRegistry>,
    spec_repo: Arc<dyn SearchSpecRepository>,
    execution_repo: Arc<dyn ExecutionRepository>,
    orchestrator: Arc<SearchOrchestrator>,
    activity: ActivityRecorder,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ExecutionManager {
    pub fn new(
        registry: Arc<ExecutionRegistry>,
        spec_repo: Arc<dyn SearchSpecRepository>,
        execution_repo: Arc<dyn ExecutionRepository>,
        orchestrator: Arc<SearchOrchestrator>,
        activity: ActivityRecorder,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            registry,
            spec_repo,
            execution_repo,
            orchestrator,
            activity,
            id_provider,
            time_provider,
        }
    }

    pub fn registry(&self) -> Arc<ExecutionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Accept a run: validate the spec, enforce the single-running-execution
    /// invariant, persist the RUNNING record, and launch the orchestrator
    /// detached from the caller. Returns the execution id immediately.
    pub async fn start(self: &Arc<Self>, search_id: &SearchId) -> Result<ExecutionId> {
        let spec = self
            .spec_repo
            .find_by_id(search_id)
            .await?
            .filter(|s| s.active)
            .ok_or_else(|| {
                AppError::NotFound(format!("no active search spec {}", search_id))
            })?;
        spec.validate()?;

        let execution_id = self.id_provider.generate_id();
        let started_at = self.time_provider.now_millis();

        let (cancel_handle, cancel_token) = cancel_channel();

        // Registering first makes the conflict check atomic with the
        // reservation; a lost race surfaces as ConflictError here
        self.registry
            .try_register(&execution_id, search_id, cancel_handle, started_at)
            .await?;

        let execution = Execution::new_running(&execution_id, search_id, started_at);
        if let Err(e) = self.execution_repo.insert(&execution).await {
            self.registry.remove(&execution_id).await;
            return Err(e);
        }

        info!(
            execution_id = %execution_id,
            search_id = %search_id,
            "search execution started"
        );

        let manager = Arc::clone(self);
        let progress = ProgressReporter::new(self.registry(), execution_id.clone());
        let exec_id = execution_id.clone();
        tokio::spawn(async move {
            let outcome = manager
                .orchestrator
                .run(&spec, &exec_id, &progress, &cancel_token)
                .await;
            manager.reconcile(execution, &spec, outcome).await;
        });

        Ok(execution_id)
    }

    /// Write the terminal Execution record and drop the live entry.
    ///
    /// Partial results already persisted stay persisted; the terminal write
    /// is retried once and then given up on (best-effort final state).
    async fn reconcile(
        &self,
        mut execution: Execution,
        spec: &SearchSpec,
        outcome: Result<OrchestratorOutcome>,
    ) {
        let now = self.time_provider.now_millis();

        let transition = match outcome {
            Ok(o) if o.cancelled => execution.cancel(now, o.total, o.new, o.duplicates),
            Ok(o) => execution.complete(now, o.total, o.new, o.duplicates),
            Err(AppError::Cancelled) => {
                // Cooperative stop raised as an error path; same terminal
                // state as an observed checkpoint
                execution.cancel(now, 0, 0, 0)
            }
            Err(e) => {
                self.activity.error(
                    &execution.id,
                    format!("Search failed: {}", e),
                    serde_json::json!({ "search_id": spec.id, "error": e.to_string() }),
                );
                let total = self
                    .registry
                    .snapshot(&execution.id)
                    .await
                    .map(|s| s.progress.results_found)
                    .unwrap_or(0);
                execution.fail(now, e.to_string()).map(|_| {
                    execution.total_results_found = total;
                })
            }
        };

        if let Err(e) = transition {
            error!(execution_id = %execution.id, error = %e, "invalid terminal transition");
        }

        // Activity entries precede the terminal record so the log is
        // complete once status turns terminal
        self.activity.flush().await;

        let mut write = self.execution_repo.update(&execution).await;
        if write.is_err() {
            warn!(
                execution_id = %execution.id,
                "terminal execution write failed, retrying once"
            );
            write = self.execution_repo.update(&execution).await;
        }
        if let Err(e) = write {
            // Best-effort final state: the run's durable record stays
            // RUNNING and status queries resolve to not_found after the
            // registry entry is dropped
            error!(
                execution_id = %execution.id,
                error = %e,
                "terminal execution write failed, final state is unknown"
            );
        }

        self.registry.remove(&execution.id).await;

        info!(
            execution_id = %execution.id,
            status = %execution.status,
            total = execution.total_results_found,
            "search execution reconciled"
        );
    }

    /// Current status: live registry first, durable terminal record second.
    pub async fn get_status(&self, execution_id: &ExecutionId) -> Result<StatusView> {
        if let Some(live) = self.registry.snapshot(execution_id).await {
            let status = if live.cancelling {
                ExecutionStatus::Cancelling
            } else {
                ExecutionStatus::Running
            };
            return Ok(StatusView {
                execution_id: execution_id.clone(),
                status,
                progress: Some(live.progress),
                uptime_ms: self.time_provider.now_millis() - live.started_at,
                error_message: None,
                total_results_found: None,
            });
        }

        let execution = self
            .execution_repo
            .find_by_id(execution_id)
            .await?
            .filter(|e| e.status.is_terminal())
            .ok_or_else(|| AppError::NotFound(format!("unknown execution {}", execution_id)))?;

        Ok(StatusView {
            execution_id: execution_id.clone(),
            status: execution.status,
            progress: None,
            uptime_ms: execution.execution_time_ms.unwrap_or(0),
            error_message: execution.error_message.clone(),
            total_results_found: Some(execution.total_results_found),
        })
    }

    /// Request cooperative cancellation. Idempotent; NotFound when the
    /// execution has no live entry.
    pub async fn cancel(&self, execution_id: &ExecutionId) -> Result<String> {
        match self.registry.request_cancel(execution_id).await? {
            CancelRequestOutcome::Requested => {
                self.activity.info(
                    execution_id,
                    "Cancellation requested",
                    serde_json::json!({}),
                );
                Ok("cancellation requested".to_string())
            }
            CancelRequestOutcome::AlreadyInProgress => {
                Ok("cancellation already in progress".to_string())
            }
        }
    }
}
