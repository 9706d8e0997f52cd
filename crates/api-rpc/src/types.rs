//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use jobscout_core::domain::{ActivityLogEntry, ProgressSnapshot, ResultRecord};
use serde::{Deserialize, Serialize};

/// search.start.v1 - Start an execution for a search spec
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub search_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub execution_id: String,
    pub search_id: String,
    pub status: String,
}

/// search.status.v1 - Poll one execution
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub execution_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub execution_id: String,
    pub status: String,
    pub progress: Option<ProgressSnapshot>,
    pub uptime_ms: i64,
    pub error_message: Option<String>,
    pub total_results_found: Option<i64>,
}

/// search.cancel.v1 - Request cooperative cancellation
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub execution_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub execution_id: String,
    pub message: String,
}

/// search.results.v1 - Query persisted results for a search spec
#[derive(Debug, Deserialize)]
pub struct ResultsRequest {
    pub search_id: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub include_duplicates: bool,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsResponse {
    pub search_id: String,
    pub total: i64,
    pub results: Vec<ResultRecord>,
}

/// search.activity.v1 - Tail the activity log of an execution
#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub execution_id: String,
    #[serde(default = "default_activity_limit")]
    pub limit: usize,
}

fn default_activity_limit() -> usize {
    50
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityResponse {
    pub execution_id: String,
    pub entries: Vec<ActivityLogEntry>,
}

/// admin.stats.v1 - Get daemon statistics
#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub live_executions: usize,
    pub uptime_seconds: i64,
    pub version: String,
}
