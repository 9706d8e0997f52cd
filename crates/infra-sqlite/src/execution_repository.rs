// SQLite ExecutionRepository Implementation

use async_trait::async_trait;
use jobscout_core::domain::{Execution, ExecutionId, ExecutionStatus, SearchId};
use jobscout_core::error::{AppError, Result};
use jobscout_core::port::ExecutionRepository;
use sqlx::SqlitePool;

use crate::error::map_sqlx_error;

pub struct SqliteExecutionRepository {
    pool: SqlitePool,
}

impl SqliteExecutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExecutionRepository for SqliteExecutionRepository {
    async fn insert(&self, execution: &Execution) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO executions (
                id, search_id, status, started_at, completed_at,
                total_results_found, new_results, duplicate_results,
                error_message, execution_time_ms
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&execution.id)
        .bind(&execution.search_id)
        .bind(execution.status.to_string())
        .bind(execution.started_at)
        .bind(execution.completed_at)
        .bind(execution.total_results_found)
        .bind(execution.new_results)
        .bind(execution.duplicate_results)
        .bind(&execution.error_message)
        .bind(execution.execution_time_ms)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update(&self, execution: &Execution) -> Result<()> {
        // Terminal records are immutable: refuse to overwrite one
        let result = sqlx::query(
            r#"
            UPDATE executions
            SET status = ?, completed_at = ?, total_results_found = ?,
                new_results = ?, duplicate_results = ?, error_message = ?,
                execution_time_ms = ?
            WHERE id = ?
              AND status NOT IN ('completed', 'failed', 'cancelled')
            "#,
        )
        .bind(execution.status.to_string())
        .bind(execution.completed_at)
        .bind(execution.total_results_found)
        .bind(execution.new_results)
        .bind(execution.duplicate_results)
        .bind(&execution.error_message)
        .bind(execution.execution_time_ms)
        .bind(&execution.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM executions WHERE id = ?")
                    .bind(&execution.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

            return match current {
                None => Err(AppError::NotFound(format!(
                    "Execution {} not found",
                    execution.id
                ))),
                Some(status) => Err(AppError::InvalidState(format!(
                    "Cannot update execution {} already in terminal state {}",
                    execution.id, status
                ))),
            };
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &ExecutionId) -> Result<Option<Execution>> {
        let row = sqlx::query_as::<_, ExecutionRow>("SELECT * FROM executions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_execution()).transpose()
    }

    async fn find_by_search(&self, search_id: &SearchId) -> Result<Vec<Execution>> {
        let rows: Vec<ExecutionRow> = sqlx::query_as(
            "SELECT * FROM executions WHERE search_id = ? ORDER BY started_at DESC",
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_execution()).collect()
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct ExecutionRow {
    id: String,
    search_id: String,
    status: String,
    started_at: i64,
    completed_at: Option<i64>,
    total_results_found: i64,
    new_results: i64,
    duplicate_results: i64,
    error_message: Option<String>,
    execution_time_ms: Option<i64>,
}

impl ExecutionRow {
    fn into_execution(self) -> Result<Execution> {
        let status: ExecutionStatus = self
            .status
            .parse()
            .map_err(AppError::Database)?;

        Ok(Execution {
            id: self.id,
            search_id: self.search_id,
            status,
            started_at: self.started_at,
            completed_at: self.completed_at,
            total_results_found: self.total_results_found,
            new_results: self.new_results,
            duplicate_results: self.duplicate_results,
            error_message: self.error_message,
            execution_time_ms: self.execution_time_ms,
        })
    }
}
