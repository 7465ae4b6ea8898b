//! Span field names recorded after a span is created.
//!
//! `tracing` span macros need literal field names, so these are only for
//! `Span::record` calls on fields declared `Empty` at span creation.

// --- HTTP (span "http.request") ---

/// Status code of the finished response.
pub const HTTP_RESPONSE_STATUS_CODE: &str = "http.response.status_code";

/// Wall-clock handling time in milliseconds.
pub const HTTP_RESPONSE_TIME_MS: &str = "http.response_time_ms";
