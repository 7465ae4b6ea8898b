//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS and request tracing. Each request gets an
//! `http.request` span carrying a request id, the status code and latency.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, field};

use medirag_observe::attrs;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http.request",
                http.request.method = %request.method(),
                url.path = %request.uri().path(),
                http.request_id = %uuid::Uuid::now_v7(),
                http.response.status_code = field::Empty,
                http.response_time_ms = field::Empty,
            )
        })
        .on_response(|response: &Response<Body>, latency: Duration, span: &Span| {
            span.record(attrs::HTTP_RESPONSE_STATUS_CODE, response.status().as_u16());
            span.record(attrs::HTTP_RESPONSE_TIME_MS, latency.as_millis() as u64);
            tracing::debug!(status = response.status().as_u16(), "Request finished");
        });

    let api_routes = Router::new()
        // Chat
        .route("/chat", post(handlers::chat::chat))
        // Knowledge base
        .route("/knowledge/search", get(handlers::knowledge::search))
        .route("/knowledge/documents", post(handlers::knowledge::add_document))
        .route("/knowledge/stats", get(handlers::knowledge::stats))
        .route("/knowledge/seed", post(handlers::knowledge::seed))
        // Sessions and users
        .route("/sessions/{id}", get(handlers::memory::get_session))
        .route("/sessions/{id}/summary", get(handlers::memory::get_summary))
        .route("/users/{id}/profile", get(handlers::memory::get_profile))
        .route("/users/{id}", delete(handlers::memory::delete_user))
        .route("/memory/stats", get(handlers::memory::stats))
        // System
        .route("/stats", get(handlers::system::get_stats))
        .route("/performance", get(handlers::system::get_performance))
        // Evaluation
        .route(
            "/evaluations",
            post(handlers::evaluation::run_evaluation).get(handlers::evaluation::list_evaluations),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(trace)
        .with_state(state)
}

/// GET /health - Liveness check.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
