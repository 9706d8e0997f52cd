// SearchSpec - immutable input describing what to search for and where

use serde::{Deserialize, Serialize};

/// Search spec ID (UUID v4)
pub type SearchId = String;

/// Query parameters for a search.
///
/// Replaces the loosely-typed parameter bag of earlier designs with named,
/// typed fields and documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text search terms (e.g. job title keywords)
    pub terms: Vec<String>,

    /// Location filter (None = anywhere)
    #[serde(default)]
    pub location: Option<String>,

    /// Only match remote listings
    #[serde(default)]
    pub remote_only: bool,

    /// Minimum salary filter, in whole currency units
    #[serde(default)]
    pub min_salary: Option<i64>,
}

impl SearchParams {
    pub fn new(terms: Vec<String>) -> Self {
        Self {
            terms,
            location: None,
            remote_only: false,
            min_salary: None,
        }
    }

    /// Human-readable summary for activity log messages
    pub fn summary(&self) -> String {
        let mut parts = vec![self.terms.join(" ")];
        if let Some(loc) = &self.location {
            parts.push(format!("in {}", loc));
        }
        if self.remote_only {
            parts.push("(remote)".to_string());
        }
        parts.join(" ")
    }
}

/// Inter-request delay policy for a source collection loop.
///
/// Exists to respect source-side rate limits: the orchestrator sleeps
/// `inter_item_delay_ms` between successive item fetches, and emits a
/// debug-severity activity entry every `progress_log_every` items rather
/// than per item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DelayPolicy {
    /// Milliseconds to sleep between item fetches (default: 200)
    pub inter_item_delay_ms: u64,

    /// Log incremental progress every Nth item (default: 5)
    pub progress_log_every: usize,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            inter_item_delay_ms: 200,
            progress_log_every: 5,
        }
    }
}

/// Immutable configuration for one search: what to look for, which sources
/// to query, and how aggressively. Owned by the caller; read-only to the
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpec {
    pub id: SearchId,
    pub name: String,

    /// Inactive specs cannot be started
    pub active: bool,

    pub params: SearchParams,

    /// Configured source names, queried in order
    pub sources: Vec<String>,

    /// Result-count cap per source (default: 25)
    pub max_results_per_source: usize,

    pub delay: DelayPolicy,

    /// Pre-filter batches against previously captured results before insert
    #[serde(default)]
    pub prefilter_duplicates: bool,

    pub created_at: i64, // epoch ms
}

impl SearchSpec {
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        name: impl Into<String>,
        params: SearchParams,
        sources: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: true,
            params,
            sources,
            max_results_per_source: 25,
            delay: DelayPolicy::default(),
            prefilter_duplicates: false,
            created_at,
        }
    }

    pub fn validate(&self) -> crate::domain::error::Result<()> {
        if self.params.terms.is_empty() {
            return Err(crate::domain::error::DomainError::ValidationError(
                "search spec has no search terms".to_string(),
            ));
        }
        if self.sources.is_empty() {
            return Err(crate::domain::error::DomainError::ValidationError(
                "search spec has no configured sources".to_string(),
            ));
        }
        if self.delay.progress_log_every == 0 {
            return Err(crate::domain::error::DomainError::ValidationError(
                "progress_log_every must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(terms: Vec<&str>, sources: Vec<&str>) -> SearchSpec {
        SearchSpec::new(
            "spec-1",
            1000,
            "rust jobs",
            SearchParams::new(terms.into_iter().map(String::from).collect()),
            sources.into_iter().map(String::from).collect(),
        )
    }

    #[test]
    fn test_validate_accepts_complete_spec() {
        assert!(spec(vec!["rust", "backend"], vec!["board-a"]).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_terms() {
        assert!(spec(vec![], vec!["board-a"]).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_sources() {
        assert!(spec(vec!["rust"], vec![]).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_progress_interval() {
        let mut spec = spec(vec!["rust"], vec!["board-a"]);
        spec.delay.progress_log_every = 0;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_params_summary() {
        let mut params = SearchParams::new(vec!["rust".into(), "engineer".into()]);
        params.location = Some("Berlin".into());
        params.remote_only = true;
        assert_eq!(params.summary(), "rust engineer in Berlin (remote)");
    }
}
