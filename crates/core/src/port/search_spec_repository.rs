// SearchSpec Repository Port (Interface)

use crate::domain::{SearchId, SearchSpec};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for SearchSpec persistence.
///
/// Specs are owned by the caller; the engine only reads them.
#[async_trait]
pub trait SearchSpecRepository: Send + Sync {
    /// Insert a new spec
    async fn insert(&self, spec: &SearchSpec) -> Result<()>;

    /// Find spec by ID
    async fn find_by_id(&self, id: &SearchId) -> Result<Option<SearchSpec>>;

    /// List all active specs
    async fn list_active(&self) -> Result<Vec<SearchSpec>>;
}

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory spec repository for tests
    pub struct InMemorySpecRepository {
        specs: Mutex<HashMap<SearchId, SearchSpec>>,
    }

    impl InMemorySpecRepository {
        pub fn new() -> Self {
            Self {
                specs: Mutex::new(HashMap::new()),
            }
        }

        pub fn with_spec(spec: SearchSpec) -> Self {
            let repo = Self::new();
            repo.specs.lock().unwrap().insert(spec.id.clone(), spec);
            repo
        }
    }

    impl Default for InMemorySpecRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl SearchSpecRepository for InMemorySpecRepository {
        async fn insert(&self, spec: &SearchSpec) -> Result<()> {
            self.specs
                .lock()
                .unwrap()
                .insert(spec.id.clone(), spec.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &SearchId) -> Result<Option<SearchSpec>> {
            Ok(self.specs.lock().unwrap().get(id).cloned())
        }

        async fn list_active(&self) -> Result<Vec<SearchSpec>> {
            Ok(self
                .specs
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.active)
                .cloned()
                .collect())
        }
    }
}
