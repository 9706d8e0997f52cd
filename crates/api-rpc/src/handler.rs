//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use std::sync::Arc;

use jsonrpsee::types::ErrorObjectOwned;

use jobscout_core::application::ExecutionManager;
use jobscout_core::port::{ActivityLog, ResultFilter, ResultRepository};

use crate::error::{throttled, to_rpc_error};
use crate::rate_limiter::RateLimiter;
use crate::types::{
    ActivityRequest, ActivityResponse, CancelRequest, CancelResponse, ResultsRequest,
    ResultsResponse, StartRequest, StartResponse, StatsRequest, StatsResponse, StatusRequest,
    StatusResponse,
};

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    manager: Arc<ExecutionManager>,
    result_repo: Arc<dyn ResultRepository>,
    activity_log: Arc<dyn ActivityLog>,
    rate_limiter: Arc<RateLimiter>,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(
        manager: Arc<ExecutionManager>,
        result_repo: Arc<dyn ResultRepository>,
        activity_log: Arc<dyn ActivityLog>,
    ) -> Self {
        // Default: 200 burst, 100 req/sec (configurable via env)
        let max_burst: u32 = std::env::var("JOBSCOUT_RATE_LIMIT_BURST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200);

        let rate_per_sec: u32 = std::env::var("JOBSCOUT_RATE_LIMIT_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        Self {
            manager,
            result_repo,
            activity_log,
            rate_limiter: Arc::new(RateLimiter::new(max_burst, rate_per_sec)),
            start_time: std::time::Instant::now(),
        }
    }

    /// search.start.v1
    pub async fn start(&self, params: StartRequest) -> Result<StartResponse, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }

        let execution_id = self
            .manager
            .start(&params.search_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(StartResponse {
            execution_id,
            search_id: params.search_id,
            status: "started".to_string(),
        })
    }

    /// search.status.v1
    pub async fn status(&self, params: StatusRequest) -> Result<StatusResponse, ErrorObjectOwned> {
        let view = self
            .manager
            .get_status(&params.execution_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(StatusResponse {
            execution_id: view.execution_id,
            status: view.status.to_string(),
            progress: view.progress,
            uptime_ms: view.uptime_ms,
            error_message: view.error_message,
            total_results_found: view.total_results_found,
        })
    }

    /// search.cancel.v1
    pub async fn cancel(&self, params: CancelRequest) -> Result<CancelResponse, ErrorObjectOwned> {
        if !self.rate_limiter.check().await {
            return Err(throttled());
        }

        let message = self
            .manager
            .cancel(&params.execution_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(CancelResponse {
            execution_id: params.execution_id,
            message,
        })
    }

    /// search.results.v1
    pub async fn results(
        &self,
        params: ResultsRequest,
    ) -> Result<ResultsResponse, ErrorObjectOwned> {
        let filter = ResultFilter {
            source: params.source,
            min_score: params.min_score,
            include_duplicates: params.include_duplicates,
            limit: params.limit,
        };

        let results = self
            .result_repo
            .find_by_search(&params.search_id, &filter)
            .await
            .map_err(to_rpc_error)?;

        let total = self
            .result_repo
            .count_by_search(&params.search_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(ResultsResponse {
            search_id: params.search_id,
            total,
            results,
        })
    }

    /// search.activity.v1
    pub async fn activity(
        &self,
        params: ActivityRequest,
    ) -> Result<ActivityResponse, ErrorObjectOwned> {
        let entries = self
            .activity_log
            .tail(&params.execution_id, params.limit)
            .await
            .map_err(to_rpc_error)?;

        Ok(ActivityResponse {
            execution_id: params.execution_id,
            entries,
        })
    }

    /// admin.stats.v1
    pub async fn stats(&self, _params: StatsRequest) -> Result<StatsResponse, ErrorObjectOwned> {
        let live_executions = self.manager.registry().live_count().await;

        Ok(StatsResponse {
            live_executions,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
            version: jobscout_core::VERSION.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::application::{
        ActivityRecorder, AdapterSet, ExecutionRegistry, SearchOrchestrator,
    };
    use jobscout_core::domain::{SearchParams, SearchSpec};
    use jobscout_core::port::activity_log::mocks::InMemoryActivityLog;
    use jobscout_core::port::execution_repository::mocks::InMemoryExecutionRepository;
    use jobscout_core::port::id_provider::mocks::SequentialIdProvider;
    use jobscout_core::port::match_scorer::KeywordScorer;
    use jobscout_core::port::result_repository::mocks::InMemoryResultRepository;
    use jobscout_core::port::search_spec_repository::mocks::InMemorySpecRepository;
    use jobscout_core::port::source_adapter::mocks::MockSourceAdapter;
    use jobscout_core::port::time_provider::mocks::TickingTimeProvider;

    fn spec() -> SearchSpec {
        SearchSpec::new(
            "spec-1",
            1000,
            "rust jobs",
            SearchParams::new(vec!["rust".to_string()]),
            vec!["board-a".to_string()],
        )
    }

    fn handler() -> RpcHandler {
        let registry = Arc::new(ExecutionRegistry::new());
        let spec_repo = Arc::new(InMemorySpecRepository::with_spec(spec()));
        let execution_repo = Arc::new(InMemoryExecutionRepository::new());
        let result_repo = Arc::new(InMemoryResultRepository::new());
        let activity_log = Arc::new(InMemoryActivityLog::new());
        let id_provider = Arc::new(SequentialIdProvider::new());
        let time_provider = Arc::new(TickingTimeProvider::new(1000, 10));

        let mut adapters = AdapterSet::new();
        adapters.register(Arc::new(MockSourceAdapter::yielding("board-a", 3)));

        let activity =
            ActivityRecorder::new(activity_log.clone(), time_provider.clone());
        let orchestrator = Arc::new(SearchOrchestrator::new(
            result_repo.clone(),
            Arc::new(KeywordScorer),
            Arc::new(adapters),
            id_provider.clone(),
            time_provider.clone(),
            activity.clone(),
        ));
        let manager = Arc::new(ExecutionManager::new(
            registry,
            spec_repo,
            execution_repo,
            orchestrator,
            activity,
            id_provider,
            time_provider,
        ));

        RpcHandler::new(manager, result_repo, activity_log)
    }

    #[tokio::test]
    async fn test_start_returns_execution_id() {
        let handler = handler();
        let response = handler
            .start(StartRequest {
                search_id: "spec-1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.status, "started");
        assert!(!response.execution_id.is_empty());
    }

    #[tokio::test]
    async fn test_start_unknown_spec_is_not_found() {
        let handler = handler();
        let err = handler
            .start(StartRequest {
                search_id: "missing".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), crate::error::code::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_of_unknown_execution_is_not_found() {
        let handler = handler();
        let err = handler
            .status(StatusRequest {
                execution_id: "nope".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), crate::error::code::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_reports_version() {
        let handler = handler();
        let stats = handler.stats(StatsRequest {}).await.unwrap();

        assert_eq!(stats.version, jobscout_core::VERSION);
    }
}
