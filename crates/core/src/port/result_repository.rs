// Result Repository Port (Interface) - the Result Store boundary

use crate::domain::{ResultRecord, SearchId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// Query filter for `find_by_search` (used by external collaborators such
/// as the dashboard; the engine itself only writes).
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub source: Option<String>,
    pub min_score: Option<f64>,
    pub include_duplicates: bool,
    pub limit: Option<usize>,
}

/// Repository interface for ResultRecord persistence.
///
/// Deduplication is advisory at write time: the store does not reject
/// duplicates, but callers may pre-filter against `existing_dedup_keys`.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Append a batch of records for a search (one call per source)
    async fn insert_batch(&self, search_id: &SearchId, records: &[ResultRecord]) -> Result<()>;

    /// Query records for a search
    async fn find_by_search(
        &self,
        search_id: &SearchId,
        filter: &ResultFilter,
    ) -> Result<Vec<ResultRecord>>;

    /// Dedup keys of all records already captured for a search
    async fn existing_dedup_keys(&self, search_id: &SearchId) -> Result<HashSet<String>>;

    /// Count records for a search
    async fn count_by_search(&self, search_id: &SearchId) -> Result<i64>;
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory result repository for tests.
    pub struct InMemoryResultRepository {
        records: Mutex<Vec<ResultRecord>>,
        fail_inserts_remaining: AtomicUsize,
    }

    impl InMemoryResultRepository {
        pub fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail_inserts_remaining: AtomicUsize::new(0),
            }
        }

        /// Make the next N insert_batch calls fail (persistence outage)
        pub fn fail_next_inserts(&self, count: usize) {
            self.fail_inserts_remaining.store(count, Ordering::SeqCst);
        }
    }

    impl Default for InMemoryResultRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ResultRepository for InMemoryResultRepository {
        async fn insert_batch(
            &self,
            _search_id: &SearchId,
            records: &[ResultRecord],
        ) -> Result<()> {
            let remaining = self.fail_inserts_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_inserts_remaining
                    .store(remaining - 1, Ordering::SeqCst);
                return Err(crate::error::AppError::Database(
                    "injected insert failure".to_string(),
                ));
            }
            self.records.lock().unwrap().extend_from_slice(records);
            Ok(())
        }

        async fn find_by_search(
            &self,
            search_id: &SearchId,
            filter: &ResultFilter,
        ) -> Result<Vec<ResultRecord>> {
            let records = self.records.lock().unwrap();
            let mut found: Vec<ResultRecord> = records
                .iter()
                .filter(|r| &r.search_id == search_id)
                .filter(|r| filter.include_duplicates || !r.is_duplicate)
                .filter(|r| {
                    filter
                        .source
                        .as_ref()
                        .map(|s| &r.source == s)
                        .unwrap_or(true)
                })
                .filter(|r| {
                    filter
                        .min_score
                        .map(|min| r.match_score >= min)
                        .unwrap_or(true)
                })
                .cloned()
                .collect();
            if let Some(limit) = filter.limit {
                found.truncate(limit);
            }
            Ok(found)
        }

        async fn existing_dedup_keys(&self, search_id: &SearchId) -> Result<HashSet<String>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| &r.search_id == search_id)
                .map(|r| r.dedup_key())
                .collect())
        }

        async fn count_by_search(&self, search_id: &SearchId) -> Result<i64> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| &r.search_id == search_id)
                .count() as i64)
        }
    }
}
