//! JobScout Search Engine - Main Entry Point
//!
//! Composition root: wires the SQLite stores, the HTTP feed adapters, and
//! the execution manager together behind the JSON-RPC server.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobscout_api_rpc::{RpcServer, RpcServerConfig};
use jobscout_core::application::{
    ActivityRecorder, AdapterSet, ExecutionManager, ExecutionRegistry, SearchOrchestrator,
};
use jobscout_core::port::id_provider::UuidProvider;
use jobscout_core::port::time_provider::SystemTimeProvider;
use jobscout_core::port::{KeywordScorer, SourceAdapter};
use jobscout_infra_sources::HttpFeedAdapter;
use jobscout_infra_sqlite::{
    create_pool, run_migrations, SqliteActivityLog, SqliteExecutionRepository,
    SqliteResultRepository, SqliteSearchSpecRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DB_PATH: &str = "~/.jobscout/jobscout.db";

fn init_logging() {
    let log_format = std::env::var("JOBSCOUT_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("jobscout=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}

/// Build the adapter set from JOBSCOUT_SOURCES (`name=url,name=url`).
///
/// Bad entries are skipped with a warning; a daemon with zero sources still
/// serves status and results queries.
fn build_adapters(sources_env: Option<&str>) -> AdapterSet {
    let mut adapters = AdapterSet::new();

    let Some(sources) = sources_env else {
        warn!("JOBSCOUT_SOURCES not set, no listing sources configured");
        return adapters;
    };

    for entry in sources.split(',').filter(|e| !e.trim().is_empty()) {
        match HttpFeedAdapter::from_entry(entry) {
            Ok(adapter) => {
                info!(source = %adapter.name(), "Registered listing source");
                adapters.register(Arc::new(adapter));
            }
            Err(e) => warn!(entry = %entry, error = %e, "Skipping invalid source entry"),
        }
    }

    adapters
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("JobScout Search Engine v{} starting...", VERSION);

    // Configuration
    let db_path = std::env::var("JOBSCOUT_DB_PATH")
        .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned());

    let rpc_port: u16 = std::env::var("JOBSCOUT_RPC_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9610);

    info!(db_path = %db_path, "Initializing database...");

    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // DI wiring
    let time_provider = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);

    let spec_repo = Arc::new(SqliteSearchSpecRepository::new(pool.clone()));
    let execution_repo = Arc::new(SqliteExecutionRepository::new(pool.clone()));
    let result_repo = Arc::new(SqliteResultRepository::new(pool.clone()));
    let activity_log = Arc::new(SqliteActivityLog::new(pool.clone()));

    let sources_env = std::env::var("JOBSCOUT_SOURCES").ok();
    let adapters = Arc::new(build_adapters(sources_env.as_deref()));

    let registry = Arc::new(ExecutionRegistry::new());
    let activity = ActivityRecorder::new(activity_log.clone(), time_provider.clone());

    let orchestrator = Arc::new(SearchOrchestrator::new(
        result_repo.clone(),
        Arc::new(KeywordScorer),
        adapters,
        id_provider.clone(),
        time_provider.clone(),
        activity.clone(),
    ));

    let manager = Arc::new(ExecutionManager::new(
        registry.clone(),
        spec_repo,
        execution_repo,
        orchestrator,
        activity.clone(),
        id_provider,
        time_provider,
    ));

    // JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        port: rpc_port,
        ..Default::default()
    };
    let rpc_server = RpcServer::new(
        rpc_config,
        manager.clone(),
        result_repo,
        activity_log,
    );
    let rpc_handle = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!("System ready. Waiting for search requests...");
    info!("Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // Cancel live executions so they resolve at their next checkpoint
    // instead of dying mid-write
    for execution_id in registry.live_ids().await {
        if let Err(e) = manager.cancel(&execution_id).await {
            warn!(execution_id = %execution_id, error = %e, "Shutdown cancel failed");
        }
    }

    // Give the orchestrators a moment to reach a checkpoint and reconcile
    let deadline = std::time::Duration::from_secs(5);
    let drained = tokio::time::timeout(deadline, async {
        while registry.live_count().await > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    })
    .await;
    if drained.is_err() {
        warn!("Some executions did not reach a checkpoint before shutdown");
    }
    activity.flush().await;

    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;

    info!("Shutdown complete.");

    Ok(())
}
