// SQLite SearchSpecRepository Implementation

use async_trait::async_trait;
use jobscout_core::domain::{DelayPolicy, SearchId, SearchParams, SearchSpec};
use jobscout_core::error::{AppError, Result};
use jobscout_core::port::SearchSpecRepository;
use sqlx::SqlitePool;

use crate::error::map_sqlx_error;

pub struct SqliteSearchSpecRepository {
    pool: SqlitePool,
}

impl SqliteSearchSpecRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchSpecRepository for SqliteSearchSpecRepository {
    async fn insert(&self, spec: &SearchSpec) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO search_specs (
                id, name, active, params, sources,
                max_results_per_source, delay, prefilter_duplicates, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&spec.id)
        .bind(&spec.name)
        .bind(spec.active as i32)
        .bind(serde_json::to_string(&spec.params)?)
        .bind(serde_json::to_string(&spec.sources)?)
        .bind(spec.max_results_per_source as i64)
        .bind(serde_json::to_string(&spec.delay)?)
        .bind(spec.prefilter_duplicates as i32)
        .bind(spec.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SearchId) -> Result<Option<SearchSpec>> {
        let row = sqlx::query_as::<_, SpecRow>("SELECT * FROM search_specs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_spec()).transpose()
    }

    async fn list_active(&self) -> Result<Vec<SearchSpec>> {
        let rows: Vec<SpecRow> =
            sqlx::query_as("SELECT * FROM search_specs WHERE active = 1 ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_spec()).collect()
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct SpecRow {
    id: String,
    name: String,
    active: i32, // SQLite boolean as integer
    params: String,
    sources: String,
    max_results_per_source: i64,
    delay: String,
    prefilter_duplicates: i32,
    created_at: i64,
}

impl SpecRow {
    fn into_spec(self) -> Result<SearchSpec> {
        let params: SearchParams = serde_json::from_str(&self.params)?;
        let sources: Vec<String> = serde_json::from_str(&self.sources)?;
        let delay: DelayPolicy = serde_json::from_str(&self.delay)?;

        if self.max_results_per_source < 0 {
            return Err(AppError::Database(format!(
                "negative max_results_per_source for spec {}",
                self.id
            )));
        }

        Ok(SearchSpec {
            id: self.id,
            name: self.name,
            active: self.active != 0,
            params,
            sources,
            max_results_per_source: self.max_results_per_source as usize,
            delay,
            prefilter_duplicates: self.prefilter_duplicates != 0,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn repo() -> SqliteSearchSpecRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteSearchSpecRepository::new(pool)
    }

    fn spec(id: &str, active: bool) -> SearchSpec {
        let mut spec = SearchSpec::new(
            id,
            1000,
            "rust jobs",
            SearchParams::new(vec!["rust".into()]),
            vec!["board-a".into()],
        );
        spec.active = active;
        spec
    }

    #[tokio::test]
    async fn test_insert_and_find_roundtrip() {
        let repo = repo().await;
        repo.insert(&spec("spec-1", true)).await.unwrap();

        let found = repo.find_by_id(&"spec-1".to_string()).await.unwrap().unwrap();
        assert_eq!(found.name, "rust jobs");
        assert_eq!(found.params.terms, vec!["rust".to_string()]);
        assert_eq!(found.sources, vec!["board-a".to_string()]);
        assert!(found.active);
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let repo = repo().await;
        assert!(repo.find_by_id(&"nope".to_string()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_active_filters_inactive() {
        let repo = repo().await;
        repo.insert(&spec("spec-1", true)).await.unwrap();
        repo.insert(&spec("spec-2", false)).await.unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "spec-1");
    }
}
