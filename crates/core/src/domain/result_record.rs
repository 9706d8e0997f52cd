// ResultRecord - one normalized matched listing persisted against a SearchSpec

use serde::{Deserialize, Serialize};

use crate::domain::search_spec::SearchId;

/// Compensation range, as advertised by the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub currency: String,
}

/// User review tri-state, defaulting to unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Unset,
    Bookmarked,
    Dismissed,
    Viewed,
}

impl Default for ReviewState {
    fn default() -> Self {
        ReviewState::Unset
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewState::Unset => write!(f, "unset"),
            ReviewState::Bookmarked => write!(f, "bookmarked"),
            ReviewState::Dismissed => write!(f, "dismissed"),
            ReviewState::Viewed => write!(f, "viewed"),
        }
    }
}

impl std::str::FromStr for ReviewState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unset" => Ok(ReviewState::Unset),
            "bookmarked" => Ok(ReviewState::Bookmarked),
            "dismissed" => Ok(ReviewState::Dismissed),
            "viewed" => Ok(ReviewState::Viewed),
            other => Err(format!("unknown review state: {}", other)),
        }
    }
}

/// Normalized output of one matched listing.
///
/// Owned by the Result Store once persisted; associated with exactly one
/// SearchSpec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub search_id: SearchId,
    pub source: String,

    pub title: String,
    pub organization: String,
    pub location: Option<String>,
    pub compensation: Option<CompensationRange>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub posted_at: Option<i64>, // epoch ms

    /// Opaque match score supplied by an external scorer
    pub match_score: f64,

    #[serde(default)]
    pub review_state: ReviewState,

    /// Flagged against prior records from the same SearchSpec
    pub is_duplicate: bool,

    pub captured_at: i64, // epoch ms
}

impl ResultRecord {
    /// Duplicate-detection identity: posting URL when present, otherwise
    /// the (source, title, organization) triple.
    pub fn dedup_key(&self) -> String {
        match &self.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!("{}::{}::{}", self.source, self.title, self.organization),
        }
    }
}
