//! End-to-end lifecycle tests over the SQLite stores
//!
//! Drives the execution manager exactly the way the daemon wires it,
//! swapping only the listing sources for mocks.

use std::sync::Arc;
use std::time::Duration;

use jobscout_core::application::{
    ActivityRecorder, AdapterSet, ExecutionManager, ExecutionRegistry, SearchOrchestrator,
};
use jobscout_core::domain::{Execution, ExecutionStatus, SearchParams, SearchSpec, Severity};
use jobscout_core::port::id_provider::UuidProvider;
use jobscout_core::port::source_adapter::mocks::{MockBehavior, MockSourceAdapter};
use jobscout_core::port::time_provider::SystemTimeProvider;
use jobscout_core::port::{
    ActivityLog, ExecutionRepository, KeywordScorer, ResultFilter, ResultRepository,
    SearchSpecRepository, SourceAdapter,
};
use jobscout_infra_sqlite::{
    create_pool, run_migrations, SqliteActivityLog, SqliteExecutionRepository,
    SqliteResultRepository, SqliteSearchSpecRepository,
};

struct Harness {
    manager: Arc<ExecutionManager>,
    execution_repo: Arc<SqliteExecutionRepository>,
    result_repo: Arc<SqliteResultRepository>,
    activity_log: Arc<SqliteActivityLog>,
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
        activity_log,
        spec_repo,
    }
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
async fn test_two_sources_complete_with_all_results() {
    let harness = harness(vec![
        Arc::new(MockSourceAdapter::yielding("board-a", 5)),
        Arc::new(MockSourceAdapter::yielding("board-b", 5)),
    ])
    .await;

    let spec = spec("spec-1", vec!["board-a", "board-b"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    let execution = wait_terminal(&harness.execution_repo, &execution_id).await;

    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert_eq!(execution.total_results_found, 10);
    assert_eq!(execution.new_results, 10);
    assert_eq!(execution.duplicate_results, 0);
    assert!(execution.completed_at.is_some());

    // Counters match what the store actually holds
    let persisted = harness
        .result_repo
        .count_by_search(&spec.id)
        .await
        .unwrap();
    assert_eq!(persisted, execution.total_results_found);
}

#[tokio::test]
async fn test_failing_source_is_non_fatal() {
    let harness = harness(vec![
        Arc::new(MockSourceAdapter::yielding("board-a", 4)),
        Arc::new(MockSourceAdapter::failing("board-down", "connection refused")),
        Arc::new(MockSourceAdapter::yielding("board-c", 3)),
    ])
    .await;

    let spec = spec("spec-1", vec!["board-a", "board-down", "board-c"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    let execution = wait_terminal(&harness.execution_repo, &execution_id).await;

    // The run completes with results from the healthy sources
    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert_eq!(execution.total_results_found, 7);

    // The failure surfaces in the activity log, not in the outcome
    let entries = harness
        .activity_log
        .tail(&execution_id, 100)
        .await
        .unwrap();
    assert!(entries
        .iter()
        .any(|e| e.severity == Severity::Error && e.message.contains("board-down")));
}

#[tokio::test]
async fn test_second_start_while_running_is_a_conflict() {
    use jobscout_core::port::source_adapter::mocks::MockBehavior;

    let harness = harness(vec![Arc::new(MockSourceAdapter::new(
        "board-slow",
        MockBehavior::Slow {
            count: 10,
            delay_ms: 50,
        },
    ))])
    .await;

    let spec = spec("spec-1", vec!["board-slow"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();

    let second = harness.manager.start(&spec.id).await;
    assert!(matches!(
        second,
        Err(jobscout_core::error::AppError::Conflict(_))
    ));

    // The first execution is untouched by the rejected start
    harness.manager.cancel(&execution_id).await.unwrap();
    wait_terminal(&harness.execution_repo, &execution_id).await;

    // And once it is terminal, a new start is accepted again
    let third = harness.manager.start(&spec.id).await.unwrap();
    assert_ne!(third, execution_id);
    wait_terminal(&harness.execution_repo, &third).await;
}

#[tokio::test]
async fn test_status_resolves_from_durable_state_after_completion() {
    let harness = harness(vec![Arc::new(MockSourceAdapter::yielding("board-a", 2))]).await;

    let spec = spec("spec-1", vec!["board-a"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    wait_terminal(&harness.execution_repo, &execution_id).await;

    let status = harness.manager.get_status(&execution_id).await.unwrap();
    assert_eq!(status.status, ExecutionStatus::Completed);
    assert_eq!(status.total_results_found, Some(2));
    assert!(status.progress.is_none());
}

#[tokio::test]
async fn test_unknown_source_is_skipped_with_activity_entry() {
    let harness = harness(vec![Arc::new(MockSourceAdapter::yielding("board-a", 3))]).await;

    let spec = spec("spec-1", vec!["board-a", "board-unconfigured"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    let execution = wait_terminal(&harness.execution_repo, &execution_id).await;

    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert_eq!(execution.total_results_found, 3);

    let entries = harness
        .activity_log
        .tail(&execution_id, 100)
        .await
        .unwrap();
    assert!(entries
        .iter()
        .any(|e| e.message.contains("board-unconfigured")));
}

#[tokio::test]
async fn test_result_filters_apply_to_persisted_results() {
    let harness = harness(vec![
        Arc::new(MockSourceAdapter::yielding("board-a", 5)),
        Arc::new(MockSourceAdapter::yielding("board-b", 5)),
    ])
    .await;

    let spec = spec("spec-1", vec!["board-a", "board-b"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    wait_terminal(&harness.execution_repo, &execution_id).await;

    let from_b = harness
        .result_repo
        .find_by_search(
            &spec.id,
            &ResultFilter {
                source: Some("board-b".to_string()),
                ..ResultFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(from_b.len(), 5);
    assert!(from_b.iter().all(|r| r.source == "board-b"));

    let limited = harness
        .result_repo
        .find_by_search(
            &spec.id,
            &ResultFilter {
                limit: Some(3),
                ..ResultFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(limited.len(), 3);
}

#[tokio::test]
async fn test_activity_log_traces_the_whole_run() {
    let harness = harness(vec![Arc::new(MockSourceAdapter::yielding("board-a", 5))]).await;

    let spec = spec("spec-1", vec!["board-a"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();
    wait_terminal(&harness.execution_repo, &execution_id).await;

    let entries = harness
        .activity_log
        .tail(&execution_id, 100)
        .await
        .unwrap();

    // Start, per-source progress, and a success entry at the end
    assert!(entries.len() >= 3);
    assert!(entries
        .iter()
        .all(|e| e.execution_id == execution_id));
    assert!(entries
        .iter()
        .any(|e| e.severity == Severity::Success));
}

#[tokio::test]
async fn test_polled_progress_is_monotonic_and_bounded() {
    let harness = harness(vec![
        Arc::new(MockSourceAdapter::new(
            "board-a",
            MockBehavior::Slow {
                count: 5,
                delay_ms: 20,
            },
        )),
        Arc::new(MockSourceAdapter::new(
            "board-b",
            MockBehavior::Slow {
                count: 5,
                delay_ms: 20,
            },
        )),
    ])
    .await;

    let spec = spec("spec-1", vec!["board-a", "board-b"]);
    harness.spec_repo.insert(&spec).await.unwrap();

    let execution_id = harness.manager.start(&spec.id).await.unwrap();

    let mut observed = Vec::new();
    for _ in 0..500 {
        match harness.manager.get_status(&execution_id).await {
            Ok(view) => {
                if let Some(progress) = view.progress {
                    observed.push(progress.completed_steps);
                }
                if view.status.is_terminal() {
                    break;
                }
            }
            Err(_) => break,
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let execution = wait_terminal(&harness.execution_repo, &execution_id).await;
    assert_eq!(execution.status, ExecutionStatus::Completed);

    assert!(!observed.is_empty());
    for window in observed.windows(2) {
        assert!(window[1] >= window[0], "progress went backwards: {:?}", observed);
    }
    assert!(observed.iter().all(|&steps| steps <= 5));
}

#[tokio::test]
async fn test_inactive_spec_cannot_start() {
    let harness = harness(vec![Arc::new(MockSourceAdapter::yielding("board-a", 3))]).await;

    let mut spec = spec("spec-1", vec!["board-a"]);
    spec.active = false;
    harness.spec_repo.insert(&spec).await.unwrap();

    let result = harness.manager.start(&spec.id).await;
    assert!(matches!(
        result,
        Err(jobscout_core::error::AppError::NotFound(_))
    ));
}
