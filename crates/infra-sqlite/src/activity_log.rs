// SQLite ActivityLog Implementation - append-only execution history

use async_trait::async_trait;
use jobscout_core::domain::{ActivityLogEntry, ExecutionId, Severity};
use jobscout_core::error::{AppError, Result};
use jobscout_core::port::ActivityLog;
use sqlx::SqlitePool;

use crate::error::map_sqlx_error;

pub struct SqliteActivityLog {
    pool: SqlitePool,
}

impl SqliteActivityLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLog for SqliteActivityLog {
    async fn append(&self, entry: &ActivityLogEntry) -> Result<()> {
        let detail = serde_json::to_string(&entry.detail)?;

        sqlx::query(
            r#"
            INSERT INTO activity_log (execution_id, timestamp, severity, message, detail)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.execution_id)
        .bind(entry.timestamp)
        .bind(entry.severity.to_string())
        .bind(&entry.message)
        .bind(&detail)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn tail(
        &self,
        execution_id: &ExecutionId,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>> {
        // Newest N by rowid, then flipped back to chronological order
        let rows: Vec<ActivityRow> = sqlx::query_as(
            r#"
            SELECT execution_id, timestamp, severity, message, detail
            FROM activity_log
            WHERE execution_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(execution_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut entries: Vec<ActivityLogEntry> = rows
            .into_iter()
            .map(|r| r.into_entry())
            .collect::<Result<_>>()?;
        entries.reverse();
        Ok(entries)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    execution_id: String,
    timestamp: i64,
    severity: String,
    message: String,
    detail: String,
}

impl ActivityRow {
    fn into_entry(self) -> Result<ActivityLogEntry> {
        let severity: Severity = self.severity.parse().map_err(AppError::Database)?;
        let detail = serde_json::from_str(&self.detail)?;

        Ok(ActivityLogEntry {
            execution_id: self.execution_id,
            timestamp: self.timestamp,
            severity,
            message: self.message,
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use serde_json::json;

    async fn log() -> SqliteActivityLog {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteActivityLog::new(pool)
    }

    fn entry(execution_id: &str, timestamp: i64, message: &str) -> ActivityLogEntry {
        ActivityLogEntry::new(
            execution_id,
            timestamp,
            Severity::Info,
            message,
            json!({ "n": timestamp }),
        )
    }

    #[tokio::test]
    async fn test_append_and_tail_chronological() {
        let log = log().await;
        for i in 0..3 {
            log.append(&entry("exec-1", 1000 + i, &format!("step {}", i)))
                .await
                .unwrap();
        }

        let entries = log.tail(&"exec-1".to_string(), 10).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "step 0");
        assert_eq!(entries[2].message, "step 2");
        assert_eq!(entries[2].detail, json!({ "n": 1002 }));
    }

    #[tokio::test]
    async fn test_tail_limits_to_newest() {
        let log = log().await;
        for i in 0..5 {
            log.append(&entry("exec-1", 1000 + i, &format!("step {}", i)))
                .await
                .unwrap();
        }

        let entries = log.tail(&"exec-1".to_string(), 2).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "step 3");
        assert_eq!(entries[1].message, "step 4");
    }

    #[tokio::test]
    async fn test_tail_is_scoped_to_execution() {
        let log = log().await;
        log.append(&entry("exec-1", 1000, "mine")).await.unwrap();
        log.append(&entry("exec-2", 1001, "theirs")).await.unwrap();

        let entries = log.tail(&"exec-1".to_string(), 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "mine");
    }
}
