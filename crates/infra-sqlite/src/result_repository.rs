// SQLite ResultRepository Implementation - the Result Store

use std::collections::HashSet;

use async_trait::async_trait;
use jobscout_core::domain::{CompensationRange, ResultRecord, ReviewState, SearchId};
use jobscout_core::error::{AppError, Result};
use jobscout_core::port::{ResultFilter, ResultRepository};
use sqlx::SqlitePool;

use crate::error::map_sqlx_error;

pub struct SqliteResultRepository {
    pool: SqlitePool,
}

impl SqliteResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultRepository for SqliteResultRepository {
    async fn insert_batch(&self, search_id: &SearchId, records: &[ResultRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        // One transaction per source batch: either the whole batch lands
        // or none of it does
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for record in records {
            let compensation = record
                .compensation
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;

            sqlx::query(
                r#"
                INSERT INTO results (
                    id, search_id, source, title, organization, location,
                    compensation, url, description, posted_at,
                    match_score, review_state, is_duplicate, captured_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.id)
            .bind(search_id)
            .bind(&record.source)
            .bind(&record.title)
            .bind(&record.organization)
            .bind(&record.location)
            .bind(&compensation)
            .bind(&record.url)
            .bind(&record.description)
            .bind(record.posted_at)
            .bind(record.match_score)
            .bind(record.review_state.to_string())
            .bind(record.is_duplicate as i32)
            .bind(record.captured_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_by_search(
        &self,
        search_id: &SearchId,
        filter: &ResultFilter,
    ) -> Result<Vec<ResultRecord>> {
        // Filters compose onto a base query; limit defaults high
        let mut sql = String::from("SELECT * FROM results WHERE search_id = ?");
        if !filter.include_duplicates {
            sql.push_str(" AND is_duplicate = 0");
        }
        if filter.source.is_some() {
            sql.push_str(" AND source = ?");
        }
        if filter.min_score.is_some() {
            sql.push_str(" AND match_score >= ?");
        }
        sql.push_str(" ORDER BY match_score DESC, captured_at DESC LIMIT ?");

        let mut query = sqlx::query_as::<_, ResultRow>(&sql).bind(search_id);
        if let Some(source) = &filter.source {
            query = query.bind(source);
        }
        if let Some(min_score) = filter.min_score {
            query = query.bind(min_score);
        }
        query = query.bind(filter.limit.unwrap_or(1000) as i64);

        let rows: Vec<ResultRow> = query
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_record()).collect()
    }

    async fn existing_dedup_keys(&self, search_id: &SearchId) -> Result<HashSet<String>> {
        let rows: Vec<(String, String, String, Option<String>)> = sqlx::query_as(
            "SELECT source, title, organization, url FROM results WHERE search_id = ?",
        )
        .bind(search_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(source, title, organization, url)| match url {
                Some(url) if !url.is_empty() => url,
                _ => format!("{}::{}::{}", source, title, organization),
            })
            .collect())
    }

    async fn count_by_search(&self, search_id: &SearchId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM results WHERE search_id = ?")
            .bind(search_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct ResultRow {
    id: String,
    search_id: String,
    source: String,
    title: String,
    organization: String,
    location: Option<String>,
    compensation: Option<String>,
    url: Option<String>,
    description: Option<String>,
    posted_at: Option<i64>,
    match_score: f64,
    review_state: String,
    is_duplicate: i32, // SQLite boolean as integer
    captured_at: i64,
}

impl ResultRow {
    fn into_record(self) -> Result<ResultRecord> {
        let compensation: Option<CompensationRange> = self
            .compensation
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        let review_state: ReviewState =
            self.review_state.parse().map_err(AppError::Database)?;

        Ok(ResultRecord {
            id: self.id,
            search_id: self.search_id,
            source: self.source,
            title: self.title,
            organization: self.organization,
            location: self.location,
            compensation,
            url: self.url,
            description: self.description,
            posted_at: self.posted_at,
            match_score: self.match_score,
            review_state,
            is_duplicate: self.is_duplicate != 0,
            captured_at: self.captured_at,
        })
    }
}
