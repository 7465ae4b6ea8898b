//! Session, user profile and memory handlers for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};

use medirag_types::memory::{ConversationSummary, MemoryEntry, MemoryStats, UserProfileView};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/sessions/{id} - Turns stored for a session, oldest first.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<MemoryEntry>>>, AppError> {
    let start = Instant::now();
    let entries = state.memory.get_session_history(&session_id).await?;
    Ok(Json(ApiResponse::ok(entries, start)))
}

/// GET /api/v1/sessions/{id}/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<ConversationSummary>>, AppError> {
    let start = Instant::now();
    let summary = state
        .memory
        .get_conversation_summary(&session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session '{session_id}' has no turns")))?;
    Ok(Json(ApiResponse::ok(summary, start)))
}

/// GET /api/v1/users/{id}/profile
///
/// Unknown users get a default profile with `stored: false`.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserProfileView>>, AppError> {
    let start = Instant::now();
    let view = state.memory.get_user_profile(&user_id).await?;
    Ok(Json(ApiResponse::ok(view, start)))
}

/// DELETE /api/v1/users/{id} - Delete a user's memories and profile.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let deleted = state.memory.clear_user_data(&user_id).await?;
    tracing::info!(user_id = %user_id, deleted, "User data deleted via API");
    Ok(Json(ApiResponse::ok(
        serde_json::json!({ "user_id": user_id, "deleted": deleted }),
        start,
    )))
}

/// GET /api/v1/memory/stats
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<MemoryStats>>, AppError> {
    let start = Instant::now();
    let stats = state.memory.stats().await?;
    Ok(Json(ApiResponse::ok(stats, start)))
}
