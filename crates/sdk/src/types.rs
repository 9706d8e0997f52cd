//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate; the SDK deliberately
//! carries no dependency on the engine crates.

use serde::{Deserialize, Serialize};

/// Response from search.start.v1
#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub execution_id: String,
    pub search_id: String,
    pub status: String,
}

/// Progress of a live execution
#[derive(Debug, Clone, Deserialize)]
pub struct Progress {
    pub current_step: String,
    pub completed_steps: u32,
    pub total_steps: u32,
    pub results_found: i64,
    pub current_source: Option<String>,
}

/// Response from search.status.v1
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub execution_id: String,
    pub status: String,
    pub progress: Option<Progress>,
    pub uptime_ms: i64,
    pub error_message: Option<String>,
    pub total_results_found: Option<i64>,
}

impl StatusResponse {
    /// True once the execution has reached completed, failed, or cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed" | "cancelled")
    }
}

/// Response from search.cancel.v1
#[derive(Debug, Clone, Deserialize)]
pub struct CancelResponse {
    pub execution_id: String,
    pub message: String,
}

/// Result query filters for search.results.v1
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultsQuery {
    pub source: Option<String>,
    pub min_score: Option<f64>,
    pub include_duplicates: bool,
    pub limit: Option<usize>,
}

/// One persisted result
#[derive(Debug, Clone, Deserialize)]
pub struct ResultItem {
    pub id: String,
    pub search_id: String,
    pub source: String,
    pub title: String,
    pub organization: String,
    pub location: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub match_score: f64,
    pub is_duplicate: bool,
    pub captured_at: i64,
}

/// Response from search.results.v1
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsResponse {
    pub search_id: String,
    pub total: i64,
    pub results: Vec<ResultItem>,
}

/// One activity log entry
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEntry {
    pub execution_id: String,
    pub timestamp: i64,
    pub severity: String,
    pub message: String,
    pub detail: serde_json::Value,
}

/// Response from search.activity.v1
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityResponse {
    pub execution_id: String,
    pub entries: Vec<ActivityEntry>,
}

/// Response from admin.stats.v1
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub live_executions: usize,
    pub uptime_seconds: i64,
    pub version: String,
}
