// ProgressSnapshot - in-flight view of a running execution

use serde::{Deserialize, Serialize};

/// Number of top-level orchestration phases (the total_steps denominator)
pub const TOTAL_STEPS: u32 = 5;

/// Transient, in-memory progress view, overwritten on every phase
/// transition and destroyed when the execution terminates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub current_step: String,
    pub completed_steps: u32,
    pub total_steps: u32,
    pub results_found: i64,
    pub current_source: Option<String>,
}

impl ProgressSnapshot {
    pub fn starting() -> Self {
        Self {
            current_step: "starting".to_string(),
            completed_steps: 0,
            total_steps: TOTAL_STEPS,
            results_found: 0,
            current_source: None,
        }
    }
}
