// ActivityLogEntry - append-only, durable log tied to an execution

use serde::{Deserialize, Serialize};

use crate::domain::execution::ExecutionId;

/// Activity severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Debug,
    Info,
    Success,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Debug => write!(f, "debug"),
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "success" => Ok(Severity::Success),
            "error" => Ok(Severity::Error),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// One structured, timestamped activity entry. Never mutated or deleted by
/// the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub execution_id: ExecutionId,
    pub timestamp: i64, // epoch ms
    pub severity: Severity,
    pub message: String,

    /// Structured detail payload (counts, source names, parameters)
    pub detail: serde_json::Value,
}

impl ActivityLogEntry {
    pub fn new(
        execution_id: impl Into<String>,
        timestamp: i64,
        severity: Severity,
        message: impl Into<String>,
        detail: serde_json::Value,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            timestamp,
            severity,
            message: message.into(),
            detail,
        }
    }
}
