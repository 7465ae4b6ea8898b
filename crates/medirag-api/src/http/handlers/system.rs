//! System-wide statistics handlers for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use medirag_types::chat::{SystemPerformance, SystemStats};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/stats - Memory, knowledge and response metrics in one view.
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SystemStats>>, AppError> {
    let start = Instant::now();
    let stats = state.rag.system_stats().await?;
    Ok(Json(ApiResponse::ok(stats, start)))
}

/// GET /api/v1/performance - Latency and retrieval figures over recorded
/// replies. 404 until at least one reply has been recorded.
pub async fn get_performance(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SystemPerformance>>, AppError> {
    let start = Instant::now();
    let performance = state
        .rag
        .evaluate_system_performance()
        .await?
        .ok_or_else(|| AppError::NotFound("No response metrics recorded yet".to_string()))?;
    Ok(Json(ApiResponse::ok(performance, start)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_performance_requires_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::for_tests(dir.path()).await;

        let err = get_performance(State(state.clone())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        state.ensure_knowledge().await.unwrap();
        state
            .rag
            .generate_response("What helps with a migraine?", "s1", None)
            .await;

        let Json(resp) = get_performance(State(state.clone())).await.unwrap();
        assert!(resp.data.is_some());

        let Json(stats) = get_stats(State(state)).await.unwrap();
        let stats = stats.data.unwrap();
        assert_eq!(stats.evaluation_metrics.total_responses, 1);
        assert!(stats.knowledge_stats.total_documents > 0);
    }
}
