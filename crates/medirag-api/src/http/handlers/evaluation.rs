//! Evaluation handlers for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use medirag_types::evaluation::EvaluationReport;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/evaluations - Run the evaluation suite and save the report.
pub async fn run_evaluation(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<EvaluationReport>>, AppError> {
    let start = Instant::now();
    state
        .ensure_knowledge()
        .await
        .map_err(|e| AppError::Internal(format!("{e:#}")))?;

    let report = state
        .evaluator
        .run_comprehensive_evaluation(&*state.knowledge, &*state.memory)
        .await?;
    Ok(Json(ApiResponse::ok(report, start)))
}

/// GET /api/v1/evaluations - Saved reports, newest first.
pub async fn list_evaluations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<EvaluationReport>>>, AppError> {
    let start = Instant::now();
    let history = state.evaluator.history().await?;
    Ok(Json(ApiResponse::ok(history, start)))
}
