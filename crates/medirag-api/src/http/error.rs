//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use medirag_types::error::{KnowledgeError, MemoryError, RagError, RepositoryError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Knowledge(KnowledgeError),
    Memory(MemoryError),
    Rag(RagError),
    Repository(RepositoryError),
    NotFound(String),
    Validation(String),
    Internal(String),
}

impl From<KnowledgeError> for AppError {
    fn from(e: KnowledgeError) -> Self {
        AppError::Knowledge(e)
    }
}

impl From<MemoryError> for AppError {
    fn from(e: MemoryError) -> Self {
        AppError::Memory(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl From<RagError> for AppError {
    fn from(e: RagError) -> Self {
        match e {
            RagError::Knowledge(e) => AppError::Knowledge(e),
            RagError::Memory(e) => AppError::Memory(e),
            RagError::Storage(e) => AppError::Repository(e),
            other => AppError::Rag(other),
        }
    }
}

fn repository_status(e: &RepositoryError) -> (StatusCode, &'static str, String) {
    match e {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", e.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string()),
    }
}

impl AppError {
    /// Status, machine-readable code and message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Knowledge(KnowledgeError::InvalidDocument(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Knowledge(KnowledgeError::DocumentNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "DOCUMENT_NOT_FOUND",
                format!("Document '{id}' not found"),
            ),
            AppError::Knowledge(KnowledgeError::Storage(e)) | AppError::Memory(MemoryError::Storage(e)) => {
                repository_status(e)
            }
            AppError::Knowledge(e) => (StatusCode::INTERNAL_SERVER_ERROR, "KNOWLEDGE_ERROR", e.to_string()),
            AppError::Memory(MemoryError::SessionNotFound(id)) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session '{id}' not found"),
            ),
            AppError::Memory(MemoryError::InvalidImport(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Rag(RagError::Timeout(secs)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "LLM_TIMEOUT",
                format!("Language model did not answer within {secs}s"),
            ),
            AppError::Rag(e) => (StatusCode::INTERNAL_SERVER_ERROR, "RAG_ERROR", e.to_string()),
            AppError::Repository(e) => repository_status(e),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ApiResponse::failure(code, message.clone());

        let request_id = body.meta.request_id;
        let error = &message;
        if status.is_server_error() {
            tracing::error!(request_id = %request_id, code, error = %error, "Request failed");
        } else {
            tracing::debug!(request_id = %request_id, code, error = %error, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_document_is_bad_request() {
        let err = AppError::from(KnowledgeError::InvalidDocument("title cannot be empty".into()));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
        assert_eq!(message, "title cannot be empty");
    }

    #[test]
    fn test_not_found_variants() {
        assert_eq!(
            AppError::from(MemoryError::SessionNotFound("s1".into())).parts().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(RepositoryError::NotFound).parts().0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::NotFound("no summary".into()).parts().1,
            "NOT_FOUND"
        );
    }

    #[test]
    fn test_nested_storage_conflict_is_409() {
        let err = AppError::from(KnowledgeError::Storage(RepositoryError::Conflict("dup".into())));
        assert_eq!(err.parts().0, StatusCode::CONFLICT);
    }

    #[test]
    fn test_rag_error_unwraps_inner_errors() {
        let err = AppError::from(RagError::Memory(MemoryError::InvalidImport("bad".into())));
        assert!(matches!(err, AppError::Memory(_)));
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_timeout_is_server_error() {
        let (status, code, _) = AppError::from(RagError::Timeout(30)).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "LLM_TIMEOUT");
    }

    #[test]
    fn test_into_response_status() {
        let resp = AppError::Validation("limit must be positive".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
