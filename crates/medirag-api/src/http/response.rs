//! JSON envelope shared by every `/api/v1` response.
//!
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 5, "version": "0.1.0" },
//!   "errors": [{ "code": "NOT_FOUND", "message": "..." }]
//! }
//! ```
//!
//! `data` is absent on failure and `errors` is absent on success.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub meta: ApiMeta,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Serialize)]
pub struct ApiMeta {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub response_time_ms: u64,
    pub version: &'static str,
}

impl ApiMeta {
    /// Meta for a request that started at `start`.
    pub fn since(start: Instant) -> Self {
        Self::with_elapsed(u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX))
    }

    fn with_elapsed(response_time_ms: u64) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            response_time_ms,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    /// Stable machine-readable code, e.g. `VALIDATION_ERROR`.
    pub code: &'static str,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, start: Instant) -> Self {
        Self {
            data: Some(data),
            meta: ApiMeta::since(start),
            errors: Vec::new(),
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            data: None,
            meta: ApiMeta::with_elapsed(0),
            errors: vec![ApiErrorDetail {
                code,
                message: message.into(),
            }],
        }
    }
}
