// RawListing - unnormalized record produced by a Source Adapter

use serde::{Deserialize, Serialize};

/// One raw listing as returned by an external source, before normalization
/// and scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub organization: String,

    #[serde(default)]
    pub location: Option<String>,

    /// Free-text compensation as advertised (e.g. "90000-120000 EUR")
    #[serde(default)]
    pub compensation: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub posted_at: Option<i64>, // epoch ms
}
