//! Cooperative cancellation tests
//!
//! Cancellation is observed at phase and source boundaries; these tests
//! pin down the terminal state, the partial results, and the idempotence
//! of repeated requests.

use std::sync::Arc;
use std::time::Duration;

use jobscout_core::application::{
    ActivityRecorder, AdapterSet, ExecutionManager, ExecutionRegistry, SearchOrchestrator,
};
use jobscout_core::domain::{Execution, ExecutionStatus, SearchParams, SearchSpec};
use jobscout_core::error::AppError;
use jobscout_core::port::id_provider::UuidProvider;
use jobscout_core::port::source_adapter::mocks::{MockBehavior, MockSourceAdapter};
use jobscout_core::port::time_provider::SystemTimeProvider;
use jobscout_core::port::{
    ExecutionRepository, KeywordScorer, ResultRepository, SearchSpecRepository, SourceAdapter,
};
use jobscout_infra_sqlite::{
    create_pool, run_migrations, SqliteActivityLog, SqliteExecutionRepository,
    SqliteResultRepository, SqliteSearchSpecRepository,
};

struct Harness {
    manager: Arc<ExecutionManager>,
    execution_repo: Arc<SqliteExecutionRepository>,
    result_repo: Arc<SqliteResultRepository>,
    spec_repo: Arc<SqliteSearchSpecRepository>,
}

async fn harness(sources: Vec<Arc<dyn SourceAdapter>>) -> Harness {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let spec_repo = Arc::new(SqliteSearchSpecRepository::new(pool.clone()));
    let execution_repo = Arc::new(SqliteExecutionRepository::new(pool.clone()));
    let result_repo = Arc::new(SqliteResultRepository::new(pool.clone()));
    let activity_log = Arc::new(SqliteActivityLog::new(pool));

    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);

    let mut adapters = AdapterSet::new();
    for source in sources {
        adapters.register(source);
    }

    let activity = ActivityRecorder::new(activity_log.clone(), time_provider.clone());
    let orchestrator = Arc::new(SearchOrchestrator::new(
        result_repo.clone(),
        Arc::new(KeywordScorer),
        Arc::new(adapters),
        id_provider.clone(),
        time_provider.clone(),
        activity.clone(),
    ));

    let manager = Arc::new(ExecutionManager::new(
        Arc::new(ExecutionRegistry::new()),
        spec_repo.clone(),
        execution_repo.clone(),
        orchestrator,
        activity,
        id_provider,
        time_provider,
    ));

    Harness {
        manager,
        execution_repo,
        result_repo,
        spec_repo,
    }
}

fn slow_source(name: &str, count: usize, delay_ms: u64) -> Arc<dyn SourceAdapter> {
    Arc::new(MockSourceAdapter::new(
        name,
        MockBehavior::Slow { count, delay_ms },
    ))
}

fn spec(id: &str, sources: Vec<&str>) -> SearchSpec {
    let mut spec = SearchSpec::new(
        id,
        1_700_000_000_000,
        "listing search",
        SearchParams::new(vec!["listing".to_string()]),
        sources.into_iter().map(String::from).collect(),
    );
    spec.delay.inter_item_delay_ms = 0;
    spec
}

async fn wait_terminal(repo: &SqliteExecutionRepository, execution_id: &str) -> Execution {
    for _ in 0..500 {
        if let Some(execution) = repo.find_by_id(&execution_id.to_string()).await.unwrap() {
            if execution.status.is_terminal() {
                return execution;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("execution {} never reached a terminal state", execution_id);
}

#[tokio::test]
async fn test_cancel_mid_run_resolves_to_cancelled() {
    let harness = harness(vec![slow_source("board-slow", 20, 50)]).await;

    let spec = spec("spec-1", vec!["board-slow"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();

    // Let it collect a few items first
    tokio::time::sleep(Duration::from_millis(150)).await;

    let message = harness.manager.cancel(&execution_id).await.unwrap();
    assert_eq!(message, "cancellation requested");

    let execution = wait_terminal(&harness.execution_repo, &execution_id).await;
    assert_eq!(execution.status, ExecutionStatus::Cancelled);
    assert!(execution.completed_at.is_some());
    assert!(execution.error_message.is_none());

    // Partial results persisted before the checkpoint stay persisted
    let persisted = harness
        .result_repo
        .count_by_search(&spec.id)
        .await
        .unwrap();
    assert_eq!(persisted, execution.total_results_found);
    assert!(persisted < 20);
}

#[tokio::test]
async fn test_repeated_cancel_is_idempotent() {
    let harness = harness(vec![slow_source("board-slow", 20, 50)]).await;

    let spec = spec("spec-1", vec!["board-slow"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let first = harness.manager.cancel(&execution_id).await.unwrap();
    assert_eq!(first, "cancellation requested");

    let second = harness.manager.cancel(&execution_id).await.unwrap();
    assert_eq!(second, "cancellation already in progress");

    let execution = wait_terminal(&harness.execution_repo, &execution_id).await;
    assert_eq!(execution.status, ExecutionStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_requested_immediately_after_start() {
    let harness = harness(vec![slow_source("board-slow", 10, 20)]).await;

    let spec = spec("spec-1", vec!["board-slow"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    harness.manager.cancel(&execution_id).await.unwrap();

    let execution = wait_terminal(&harness.execution_repo, &execution_id).await;
    assert_eq!(execution.status, ExecutionStatus::Cancelled);

    // Depending on which checkpoint observed the request, anywhere from
    // zero to the full batch may have landed
    let persisted = harness
        .result_repo
        .count_by_search(&spec.id)
        .await
        .unwrap();
    assert!((0..=10).contains(&persisted));
    assert_eq!(persisted, execution.total_results_found);
}

#[tokio::test]
async fn test_cancel_unknown_execution_is_not_found() {
    let harness = harness(vec![]).await;

    let result = harness.manager.cancel(&"no-such-execution".to_string()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_cancel_after_terminal_is_not_found() {
    let harness = harness(vec![Arc::new(MockSourceAdapter::yielding("board-a", 2))]).await;

    let spec = spec("spec-1", vec!["board-a"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    wait_terminal(&harness.execution_repo, &execution_id).await;

    let result = harness.manager.cancel(&execution_id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_status_shows_cancelling_before_checkpoint() {
    let harness = harness(vec![slow_source("board-slow", 20, 50)]).await;

    let spec = spec("spec-1", vec!["board-slow"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    harness.manager.cancel(&execution_id).await.unwrap();

    // The live view flips to cancelling until the orchestrator reaches
    // its next checkpoint
    let status = harness.manager.get_status(&execution_id).await.unwrap();
    assert!(matches!(
        status.status,
        ExecutionStatus::Cancelling | ExecutionStatus::Cancelled
    ));

    wait_terminal(&harness.execution_repo, &execution_id).await;
}
