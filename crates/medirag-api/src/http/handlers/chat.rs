//! Chat handler for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use medirag_types::chat::{ChatReply, ChatRequest};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/chat - Generate a reply for one message.
///
/// A missing `session_id` starts a new session; its id is returned in the
/// reply. Pipeline failures come back as an apology reply with `error` set.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, AppError> {
    let start = Instant::now();

    if body.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }
    let session_id = body
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::now_v7().to_string());

    let reply = state
        .rag
        .generate_response(&body.message, &session_id, body.user_id.as_deref())
        .await;

    Ok(Json(ApiResponse::ok(reply, start)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chat_creates_session_and_remembers_turn() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::for_tests(dir.path()).await;
        state.ensure_knowledge().await.unwrap();

        let Json(resp) = chat(
            State(state.clone()),
            Json(ChatRequest {
                message: "What are the symptoms of diabetes?".to_string(),
                session_id: None,
                user_id: Some("u1".to_string()),
            }),
        )
        .await
        .unwrap();

        let reply = resp.data.unwrap();
        assert!(!reply.response.is_empty());
        assert!(reply.error.is_none());

        let history = state.memory.get_session_history(&reply.session_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_message, "What are the symptoms of diabetes?");
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::for_tests(dir.path()).await;

        let err = chat(
            State(state),
            Json(ChatRequest {
                message: "   ".to_string(),
                session_id: None,
                user_id: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
