// Activity Log Port (Interface)

use crate::domain::{ActivityLogEntry, ExecutionId};
use crate::error::Result;
use async_trait::async_trait;

/// Append-only, durable activity log keyed by execution id.
///
/// Must be safe for concurrent writers; the engine never mutates or deletes
/// entries.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append one entry
    async fn append(&self, entry: &ActivityLogEntry) -> Result<()>;

    /// Last `limit` entries for an execution, oldest first
    async fn tail(&self, execution_id: &ExecutionId, limit: usize) -> Result<Vec<ActivityLogEntry>>;
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// In-memory activity log for tests
    pub struct InMemoryActivityLog {
        entries: Mutex<Vec<ActivityLogEntry>>,
    }

    impl InMemoryActivityLog {
        pub fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
            }
        }

        pub fn all(&self) -> Vec<ActivityLogEntry> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl Default for InMemoryActivityLog {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ActivityLog for InMemoryActivityLog {
        async fn append(&self, entry: &ActivityLogEntry) -> Result<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn tail(
            &self,
            execution_id: &ExecutionId,
            limit: usize,
        ) -> Result<Vec<ActivityLogEntry>> {
            let entries = self.entries.lock().unwrap();
            let matching: Vec<ActivityLogEntry> = entries
                .iter()
                .filter(|e| &e.execution_id == execution_id)
                .cloned()
                .collect();
            let start = matching.len().saturating_sub(limit);
            Ok(matching[start..].to_vec())
        }
    }
}
