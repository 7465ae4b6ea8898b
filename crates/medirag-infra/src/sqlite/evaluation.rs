//! SQLite evaluation history repository implementation.
//!
//! Reports are stored whole as JSON; id, timestamp and overall score are
//! kept as columns for ordering and listing.

use medirag_core::repository::evaluation::EvaluationRepository;
use medirag_types::error::RepositoryError;
use medirag_types::evaluation::EvaluationReport;

use super::codec::{format_datetime, from_json, query_error, to_json};
use super::pool::DatabasePool;

/// SQLite-backed implementation of `EvaluationRepository`.
pub struct SqliteEvaluationRepository {
    pool: DatabasePool,
}

impl SqliteEvaluationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl EvaluationRepository for SqliteEvaluationRepository {
    async fn save(&self, report: &EvaluationReport) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO evaluation_runs (id, timestamp, overall_score, report) VALUES (?, ?, ?, ?)",
        )
        .bind(report.id.to_string())
        .bind(format_datetime(&report.timestamp))
        .bind(report.overall_score)
        .bind(to_json(report)?)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<EvaluationReport>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT report FROM evaluation_runs ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter().map(|(raw,)| from_json("report", raw)).collect()
    }

    async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM evaluation_runs")
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected())
    }
}
