// JobScout Infrastructure - Listing Source Adapters
// Implements: SourceAdapter over JSON-over-HTTP feeds

pub mod http_feed;

pub use http_feed::HttpFeedAdapter;
