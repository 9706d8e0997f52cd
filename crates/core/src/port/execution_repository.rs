// Execution Repository Port (Interface)

use crate::domain::{Execution, ExecutionId, SearchId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Execution persistence.
///
/// Executions are created by `start` and mutated only by the Execution
/// Manager; never deleted by the engine (retention is an external concern).
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Insert a new execution
    async fn insert(&self, execution: &Execution) -> Result<()>;

    /// Update an execution (terminal reconcile)
    async fn update(&self, execution: &Execution) -> Result<()>;

    /// Find execution by ID
    async fn find_by_id(&self, id: &ExecutionId) -> Result<Option<Execution>>;

    /// Find executions for a search, newest first
    async fn find_by_search(&self, search_id: &SearchId) -> Result<Vec<Execution>>;
}

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory execution repository for tests.
    ///
    /// `fail_updates_remaining` makes the next N update calls fail, for
    /// exercising the terminal-write retry path.
    pub struct InMemoryExecutionRepository {
        executions: Mutex<HashMap<ExecutionId, Execution>>,
        fail_updates_remaining: AtomicUsize,
    }

    impl InMemoryExecutionRepository {
        pub fn new() -> Self {
            Self {
                executions: Mutex::new(HashMap::new()),
                fail_updates_remaining: AtomicUsize::new(0),
            }
        }

        pub fn fail_next_updates(&self, count: usize) {
            self.fail_updates_remaining.store(count, Ordering::SeqCst);
        }
    }

    impl Default for InMemoryExecutionRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ExecutionRepository for InMemoryExecutionRepository {
        async fn insert(&self, execution: &Execution) -> Result<()> {
            self.executions
                .lock()
                .unwrap()
                .insert(execution.id.clone(), execution.clone());
            Ok(())
        }

        async fn update(&self, execution: &Execution) -> Result<()> {
            let remaining = self.fail_updates_remaining.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_updates_remaining
                    .store(remaining - 1, Ordering::SeqCst);
                return Err(crate::error::AppError::Database(
                    "injected update failure".to_string(),
                ));
            }
            self.executions
                .lock()
                .unwrap()
                .insert(execution.id.clone(), execution.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &ExecutionId) -> Result<Option<Execution>> {
            Ok(self.executions.lock().unwrap().get(id).cloned())
        }

        async fn find_by_search(&self, search_id: &SearchId) -> Result<Vec<Execution>> {
            let mut found: Vec<Execution> = self
                .executions
                .lock()
                .unwrap()
                .values()
                .filter(|e| &e.search_id == search_id)
                .cloned()
                .collect();
            found.sort_by_key(|e| std::cmp::Reverse(e.started_at));
            Ok(found)
        }
    }
}
