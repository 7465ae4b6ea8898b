//! Knowledge base handlers for the REST API.

use std::time::Instant;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use medirag_types::knowledge::{Category, Document, KnowledgeStats, NewDocument, SearchResult};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

const MAX_SEARCH_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub category: Option<String>,
}

fn default_limit() -> usize {
    5
}

/// GET /api/v1/knowledge/search - Search the knowledge base.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchResult>>>, AppError> {
    let start = Instant::now();

    if query.limit == 0 || query.limit > MAX_SEARCH_LIMIT {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_SEARCH_LIMIT}"
        )));
    }
    let category = query
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(AppError::Validation)?;

    let results = state.knowledge.search(&query.q, query.limit, category).await?;
    Ok(Json(ApiResponse::ok(results, start)))
}

/// POST /api/v1/knowledge/documents - Chunk, embed and store a document.
pub async fn add_document(
    State(state): State<AppState>,
    Json(body): Json<NewDocument>,
) -> Result<Json<ApiResponse<Document>>, AppError> {
    let start = Instant::now();
    let document = state.knowledge.add_document(body).await?;
    Ok(Json(ApiResponse::ok(document, start)))
}

/// GET /api/v1/knowledge/stats
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<KnowledgeStats>>, AppError> {
    let start = Instant::now();
    let stats = state.knowledge.stats().await?;
    Ok(Json(ApiResponse::ok(stats, start)))
}

/// POST /api/v1/knowledge/seed - Load the built-in dataset into an empty
/// knowledge base.
pub async fn seed(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let added = state.knowledge.seed_healthcare_data().await?;
    Ok(Json(ApiResponse::ok(
        serde_json::json!({ "documents_added": added }),
        start,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::for_tests(dir.path()).await;
        (dir, state)
    }

    #[tokio::test]
    async fn test_seed_then_search() {
        let (_dir, state) = state().await;

        let Json(seeded) = seed(State(state.clone())).await.unwrap();
        assert!(seeded.data.unwrap()["documents_added"].as_u64().unwrap() > 0);

        let Json(again) = seed(State(state.clone())).await.unwrap();
        assert_eq!(again.data.unwrap()["documents_added"], 0);

        let Json(found) = search(
            State(state),
            Query(SearchQuery {
                q: "diabetes blood sugar".to_string(),
                limit: 3,
                category: None,
            }),
        )
        .await
        .unwrap();
        let results = found.data.unwrap();
        assert!(results.len() <= 3);
        assert!(!results.is_empty());
    }

    #[tokio::test]
    async fn test_search_validates_parameters() {
        let (_dir, state) = state().await;

        let err = search(
            State(state.clone()),
            Query(SearchQuery {
                q: "fever".to_string(),
                limit: 0,
                category: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = search(
            State(state),
            Query(SearchQuery {
                q: "fever".to_string(),
                limit: 5,
                category: Some("astrology".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_document_and_stats() {
        let (_dir, state) = state().await;

        let Json(added) = add_document(
            State(state.clone()),
            Json(NewDocument {
                title: "Hydration".to_string(),
                content: "Drink water regularly. Thirst is a late signal of dehydration.".to_string(),
                category: Category::Prevention,
                source: "test".to_string(),
                tags: vec!["water".to_string()],
            }),
        )
        .await
        .unwrap();
        assert_eq!(added.data.unwrap().title, "Hydration");

        let Json(stats) = stats(State(state)).await.unwrap();
        let stats = stats.data.unwrap();
        assert_eq!(stats.total_documents, 1);
        assert!(stats.total_chunks >= 1);
    }

    #[tokio::test]
    async fn test_add_document_rejects_empty_title() {
        let (_dir, state) = state().await;
        let err = add_document(
            State(state),
            Json(NewDocument {
                title: "  ".to_string(),
                content: "Some content.".to_string(),
                category: Category::General,
                source: "test".to_string(),
                tags: Vec::new(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.parts().0, axum::http::StatusCode::BAD_REQUEST);
    }
}
