// HTTP feed source adapter
// Queries a JSON listing feed and drips items out under the delay policy

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use jobscout_core::application::cancel::CancelToken;
use jobscout_core::domain::{DelayPolicy, RawListing, SearchParams};
use jobscout_core::port::{SourceAdapter, SourceAdapterError};

/// Request timeout for one feed query
const REQUEST_TIMEOUT_MS: u64 = 30_000;

/// One listing item as served by a feed. Field names vary between boards;
/// aliases cover the common spellings.
#[derive(Debug, Deserialize)]
struct FeedItem {
    title: String,

    #[serde(alias = "company")]
    organization: String,

    #[serde(default)]
    location: Option<String>,

    #[serde(default, alias = "salary")]
    compensation: Option<String>,

    #[serde(default, alias = "link")]
    url: Option<String>,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    posted_at: Option<i64>,
}

impl From<FeedItem> for RawListing {
    fn from(item: FeedItem) -> Self {
        RawListing {
            title: item.title,
            organization: item.organization,
            location: item.location,
            compensation: item.compensation,
            url: item.url,
            description: item.description,
            posted_at: item.posted_at,
        }
    }
}

/// Source adapter over a JSON-over-HTTP listing feed.
///
/// One adapter instance per configured source; the feed endpoint receives
/// the query parameters and returns a JSON array of listings. Items are
/// released with `inter_item_delay_ms` between them so a burst of feed
/// items never turns into a burst of downstream work.
pub struct HttpFeedAdapter {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpFeedAdapter {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, SourceAdapterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .map_err(|e| SourceAdapterError::Connection(e.to_string()))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into(),
            client,
        })
    }

    /// Parse a `name=url` source entry as found in configuration
    pub fn from_entry(entry: &str) -> Result<Self, SourceAdapterError> {
        let (name, url) = entry.split_once('=').ok_or_else(|| {
            SourceAdapterError::Rejected(format!(
                "invalid source entry '{}', expected name=url",
                entry
            ))
        })?;
        Self::new(name.trim(), url.trim())
    }

    fn build_query(params: &SearchParams, max_results: usize) -> Vec<(String, String)> {
        let mut query = vec![
            ("q".to_string(), params.terms.join(" ")),
            ("limit".to_string(), max_results.to_string()),
        ];
        if let Some(location) = &params.location {
            query.push(("location".to_string(), location.clone()));
        }
        if params.remote_only {
            query.push(("remote".to_string(), "true".to_string()));
        }
        if let Some(min_salary) = params.min_salary {
            query.push(("min_salary".to_string(), min_salary.to_string()));
        }
        query
    }

    async fn query_feed(
        &self,
        params: &SearchParams,
        max_results: usize,
    ) -> Result<Vec<FeedItem>, SourceAdapterError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::build_query(params, max_results))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceAdapterError::Timeout(REQUEST_TIMEOUT_MS)
                } else {
                    SourceAdapterError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceAdapterError::Rejected(format!(
                "{} returned {}: {}",
                self.name, status, body
            )));
        }

        response
            .json::<Vec<FeedItem>>()
            .await
            .map_err(|e| SourceAdapterError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl SourceAdapter for HttpFeedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(
        &self,
        params: &SearchParams,
        max_results: usize,
        delay: &DelayPolicy,
        cancel: &CancelToken,
    ) -> Result<Vec<RawListing>, SourceAdapterError> {
        info!(
            source = %self.name,
            query = %params.summary(),
            max_results = max_results,
            "Querying listing feed"
        );

        let items = self.query_feed(params, max_results).await?;

        // Drip items under the delay policy; a cancellation observed
        // mid-batch returns what was collected so far
        let mut listings = Vec::with_capacity(items.len().min(max_results));
        for item in items.into_iter().take(max_results) {
            if cancel.is_cancelled() {
                debug!(
                    source = %self.name,
                    collected = listings.len(),
                    "Cancellation observed mid-batch, returning partial results"
                );
                break;
            }
            if !listings.is_empty() && delay.inter_item_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay.inter_item_delay_ms)).await;
            }
            listings.push(RawListing::from(item));
        }

        info!(
            source = %self.name,
            collected = listings.len(),
            "Feed query completed"
        );

        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_includes_optional_filters() {
        let mut params = SearchParams::new(vec!["rust".to_string(), "backend".to_string()]);
        params.location = Some("Berlin".to_string());
        params.remote_only = true;
        params.min_salary = Some(90_000);

        let query = HttpFeedAdapter::build_query(&params, 25);

        assert!(query.contains(&("q".to_string(), "rust backend".to_string())));
        assert!(query.contains(&("limit".to_string(), "25".to_string())));
        assert!(query.contains(&("location".to_string(), "Berlin".to_string())));
        assert!(query.contains(&("remote".to_string(), "true".to_string())));
        assert!(query.contains(&("min_salary".to_string(), "90000".to_string())));
    }

    #[test]
    fn test_build_query_omits_unset_filters() {
        let params = SearchParams::new(vec!["rust".to_string()]);
        let query = HttpFeedAdapter::build_query(&params, 10);

        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_feed_item_accepts_aliased_fields() {
        let item: FeedItem = serde_json::from_str(
            r#"{
                "title": "Rust Engineer",
                "company": "Acme",
                "salary": "90000-120000 EUR",
                "link": "https://board.example/jobs/1"
            }"#,
        )
        .unwrap();

        let listing = RawListing::from(item);
        assert_eq!(listing.organization, "Acme");
        assert_eq!(listing.compensation.as_deref(), Some("90000-120000 EUR"));
        assert_eq!(listing.url.as_deref(), Some("https://board.example/jobs/1"));
    }

    #[test]
    fn test_from_entry_parses_name_and_url() {
        let adapter = HttpFeedAdapter::from_entry("board-a = https://board-a.example/feed").unwrap();
        assert_eq!(adapter.name(), "board-a");
        assert_eq!(adapter.base_url, "https://board-a.example/feed");
    }

    #[test]
    fn test_from_entry_rejects_missing_url() {
        assert!(HttpFeedAdapter::from_entry("board-a").is_err());
    }
}
