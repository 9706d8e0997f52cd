// Source Adapter Port - boundary to one external listing provider

use crate::application::cancel::CancelToken;
use crate::domain::{DelayPolicy, RawListing, SearchParams};
use async_trait::async_trait;
use thiserror::Error;

/// Source adapter errors.
///
/// One failed source is logged and non-fatal to the run; the orchestrator
/// proceeds to the next source without retrying.
#[derive(Error, Debug)]
pub enum SourceAdapterError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Source rejected query: {0}")]
    Rejected(String),
}

/// One external listing provider.
///
/// Implementations must honor the cancellation token between item fetches
/// and sleep per the delay policy to respect source-side rate limits. A
/// cancelled fetch returns the items collected so far rather than an error;
/// the orchestrator observes the token itself at the next checkpoint.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source name as configured in a SearchSpec
    fn name(&self) -> &str;

    /// Fetch up to `max_results` raw listings matching `params`
    async fn fetch(
        &self,
        params: &SearchParams,
        max_results: usize,
        delay: &DelayPolicy,
        cancel: &CancelToken,
    ) -> Result<Vec<RawListing>, SourceAdapterError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock adapter behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Yield `count` synthetic listings
        Yield(usize),
        /// Fail with a connection error
        Fail(String),
        /// Sleep `delay_ms` before each of `count` items (for cancellation
        /// timing tests)
        Slow { count: usize, delay_ms: u64 },
    }

    /// Mock Source Adapter for testing
    pub struct MockSourceAdapter {
        name: String,
        behavior: MockBehavior,
        call_count: Arc<AtomicUsize>,
    }

    impl MockSourceAdapter {
        pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
            Self {
                name: name.into(),
                behavior,
                call_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn yielding(name: impl Into<String>, count: usize) -> Self {
            Self::new(name, MockBehavior::Yield(count))
        }

        pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
            Self::new(name, MockBehavior::Fail(message.into()))
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        fn listing(&self, index: usize) -> RawListing {
            RawListing {
                title: format!("Listing {} from {}", index, self.name),
                organization: format!("Org {}", index % 3),
                location: Some("Remote".to_string()),
                compensation: Some("80000-110000 EUR".to_string()),
                url: Some(format!("https://{}.example/jobs/{}", self.name, index)),
                description: Some("Synthetic listing for tests".to_string()),
                posted_at: Some(1_700_000_000_000 + index as i64),
            }
        }
    }

    #[async_trait]
    impl SourceAdapter for MockSourceAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch(
            &self,
            _params: &SearchParams,
            max_results: usize,
            _delay: &DelayPolicy,
            cancel: &CancelToken,
        ) -> Result<Vec<RawListing>, SourceAdapterError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);

            match &self.behavior {
                MockBehavior::Yield(count) => Ok((0..*count.min(&max_results))
                    .map(|i| self.listing(i))
                    .collect()),
                MockBehavior::Fail(message) => {
                    Err(SourceAdapterError::Connection(message.clone()))
                }
                MockBehavior::Slow { count, delay_ms } => {
                    let mut listings = Vec::new();
                    for i in 0..*count.min(&max_results) {
                        if cancel.is_cancelled() {
                            break;
                        }
                        tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                        listings.push(self.listing(i));
                    }
                    Ok(listings)
                }
            }
        }
    }
}
