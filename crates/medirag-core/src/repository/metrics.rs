//! Response metrics repository trait definition.

use medirag_types::chat::ResponseMetrics;
use medirag_types::error::RepositoryError;

/// Append-only log of per-reply metrics.
pub trait MetricsRepository: Send + Sync {
    fn record(
        &self,
        session_id: &str,
        metrics: &ResponseMetrics,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All recorded metrics, oldest first.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ResponseMetrics>, RepositoryError>> + Send;

    fn clear(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
