//! Evaluation history repository trait definition.

use medirag_types::error::RepositoryError;
use medirag_types::evaluation::EvaluationReport;

/// Stored evaluation reports, newest first on read.
pub trait EvaluationRepository: Send + Sync {
    fn save(
        &self,
        report: &EvaluationReport,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Up to `limit` most recent reports, newest first.
    fn list(
        &self,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<EvaluationReport>, RepositoryError>> + Send;

    /// Delete all reports. Returns the number removed.
    fn clear(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
