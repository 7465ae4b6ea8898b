//! SQLite response metrics repository implementation.

use chrono::Utc;
use sqlx::Row;

use medirag_core::repository::metrics::MetricsRepository;
use medirag_types::chat::ResponseMetrics;
use medirag_types::error::RepositoryError;

use super::codec::{format_datetime, query_error};
use super::pool::DatabasePool;

/// SQLite-backed implementation of `MetricsRepository`.
pub struct SqliteMetricsRepository {
    pool: DatabasePool,
}

impl SqliteMetricsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn metrics_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ResponseMetrics, sqlx::Error> {
    let count = |column: &str| row.try_get::<i64, _>(column).map(|n| n as usize);
    Ok(ResponseMetrics {
        response_time: row.try_get("response_time")?,
        knowledge_relevance: row.try_get("knowledge_relevance")?,
        memory_utilization: count("memory_utilization")?,
        response_length: count("response_length")?,
        user_message_length: count("user_message_length")?,
        knowledge_sources_count: count("knowledge_sources_count")?,
        average_knowledge_score: row.try_get("average_knowledge_score")?,
    })
}

impl MetricsRepository for SqliteMetricsRepository {
    async fn record(&self, session_id: &str, metrics: &ResponseMetrics) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO response_metrics (session_id, recorded_at, response_time, knowledge_relevance, memory_utilization, response_length, user_message_length, knowledge_sources_count, average_knowledge_score)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(session_id)
        .bind(format_datetime(&Utc::now()))
        .bind(metrics.response_time)
        .bind(metrics.knowledge_relevance)
        .bind(metrics.memory_utilization as i64)
        .bind(metrics.response_length as i64)
        .bind(metrics.user_message_length as i64)
        .bind(metrics.knowledge_sources_count as i64)
        .bind(metrics.average_knowledge_score)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<ResponseMetrics>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM response_metrics ORDER BY id ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|r| metrics_from_row(r).map_err(query_error))
            .collect()
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM response_metrics")
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(response_time: f64) -> ResponseMetrics {
        ResponseMetrics {
            response_time,
            knowledge_relevance: 0.72,
            memory_utilization: 2,
            response_length: 640,
            user_message_length: 31,
            knowledge_sources_count: 3,
            average_knowledge_score: 0.68,
        }
    }

    #[tokio::test]
    async fn test_record_list_clear() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteMetricsRepository::new(DatabasePool::open(dir.path()).await.unwrap());

        repo.record("s1", &metrics(1.5)).await.unwrap();
        repo.record("s2", &metrics(0.25)).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].response_time, 1.5);
        assert_eq!(listed[1].knowledge_sources_count, 3);

        assert_eq!(repo.clear().await.unwrap(), 2);
        assert!(repo.list().await.unwrap().is_empty());
    }
}
