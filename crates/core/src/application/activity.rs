// Activity Recorder - fire-and-forget writer in front of the ActivityLog port
//
// A failed append must never abort the run: entries travel over a channel
// to a drain task, and append errors go to the process log (tracing) only.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::domain::{ActivityLogEntry, ExecutionId, Severity};
use crate::port::{ActivityLog, TimeProvider};

enum Message {
    Entry(ActivityLogEntry),
    /// Resolves once every entry sent before it has been written
    Flush(oneshot::Sender<()>),
}

/// Channel-backed activity recorder. Cloneable; one drain task per
/// recorder preserves entry order.
#[derive(Clone)]
pub struct ActivityRecorder {
    tx: mpsc::UnboundedSender<Message>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ActivityRecorder {
    /// Create a recorder and spawn its drain task
    pub fn new(log: Arc<dyn ActivityLog>, time_provider: Arc<dyn TimeProvider>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Entry(entry) => {
                        if let Err(e) = log.append(&entry).await {
                            // Fallback sink: a logging failure is itself
                            // logged and otherwise ignored
                            warn!(
                                execution_id = %entry.execution_id,
                                error = %e,
                                "failed to persist activity entry"
                            );
                        }
                    }
                    Message::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });

        Self { tx, time_provider }
    }

    fn emit(
        &self,
        execution_id: &ExecutionId,
        severity: Severity,
        message: impl Into<String>,
        detail: serde_json::Value,
    ) {
        let entry = ActivityLogEntry::new(
            execution_id.clone(),
            self.time_provider.now_millis(),
            severity,
            message,
            detail,
        );
        // Send failure means the drain task is gone; nothing left to do
        let _ = self.tx.send(Message::Entry(entry));
    }

    pub fn debug(
        &self,
        execution_id: &ExecutionId,
        message: impl Into<String>,
        detail: serde_json::Value,
    ) {
        self.emit(execution_id, Severity::Debug, message, detail);
    }

    pub fn info(
        &self,
        execution_id: &ExecutionId,
        message: impl Into<String>,
        detail: serde_json::Value,
    ) {
        self.emit(execution_id, Severity::Info, message, detail);
    }

    pub fn success(
        &self,
        execution_id: &ExecutionId,
        message: impl Into<String>,
        detail: serde_json::Value,
    ) {
        self.emit(execution_id, Severity::Success, message, detail);
    }

    pub fn error(
        &self,
        execution_id: &ExecutionId,
        message: impl Into<String>,
        detail: serde_json::Value,
    ) {
        self.emit(execution_id, Severity::Error, message, detail);
    }

    /// Wait until all previously emitted entries have been written.
    ///
    /// The manager flushes before writing a terminal execution record, so
    /// the activity log is complete by the time status turns terminal.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Message::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::activity_log::mocks::InMemoryActivityLog;
    use crate::port::time_provider::mocks::TickingTimeProvider;
    use serde_json::json;

    #[tokio::test]
    async fn test_entries_arrive_in_order() {
        let log = Arc::new(InMemoryActivityLog::new());
        let recorder = ActivityRecorder::new(
            log.clone(),
            Arc::new(TickingTimeProvider::new(1000, 10)),
        );

        let exec = "exec-1".to_string();
        recorder.info(&exec, "first", json!({}));
        recorder.debug(&exec, "second", json!({"n": 2}));
        recorder.success(&exec, "third", json!({}));
        recorder.flush().await;

        let entries = log.all();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].message, "second");
        assert_eq!(entries[2].message, "third");
        assert_eq!(entries[0].severity, Severity::Info);
        assert_eq!(entries[2].severity, Severity::Success);
    }

    #[tokio::test]
    async fn test_flush_with_no_entries_returns() {
        let log = Arc::new(InMemoryActivityLog::new());
        let recorder =
            ActivityRecorder::new(log, Arc::new(TickingTimeProvider::new(1000, 10)));
        recorder.flush().await;
    }
}
