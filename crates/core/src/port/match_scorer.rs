// Match Scorer Port - opaque scoring of one listing against search params

use crate::domain::{RawListing, SearchParams};

/// Scoring function for one raw listing. The engine treats the score as
/// opaque; it is stored on the ResultRecord as-is.
pub trait MatchScorer: Send + Sync {
    /// Score in [0.0, 1.0]
    fn score(&self, params: &SearchParams, listing: &RawListing) -> f64;
}

/// Keyword-overlap scorer (production default): fraction of search terms
/// present in the listing title or description, case-insensitive.
pub struct KeywordScorer;

impl MatchScorer for KeywordScorer {
    fn score(&self, params: &SearchParams, listing: &RawListing) -> f64 {
        if params.terms.is_empty() {
            return 0.0;
        }

        let haystack = format!(
            "{} {}",
            listing.title,
            listing.description.as_deref().unwrap_or("")
        )
        .to_lowercase();

        let matched = params
            .terms
            .iter()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .count();

        matched as f64 / params.terms.len() as f64
    }
}
