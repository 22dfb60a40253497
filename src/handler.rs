//! Centralized error-to-response translation.
//!
//! The single seam where gate denials become HTTP responses. The gate never
//! shapes responses; it hands every [`ApiError`] to the configured handler.

use std::sync::Arc;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::errors::{secs_ceil, ApiError};

/// Process-wide exception handler: maps any gate denial to an HTTP response.
pub type ExceptionHandler = Arc<dyn Fn(&ApiError) -> Response + Send + Sync>;

/// Built-in exception handler.
///
/// Renders `{"detail": ..., "code": ...}` with the kind's status, a
/// `WWW-Authenticate` challenge when the error carries one, and `Retry-After`
/// (whole seconds, rounded up) on throttling.
pub fn default_exception_handler(err: &ApiError) -> Response {
    let body = Json(json!({
        "detail": err.detail(),
        "code": err.code(),
    }));
    let mut response = (err.status_code(), body).into_response();

    if let Some(challenge) = err.auth_header() {
        if let Ok(value) = header::HeaderValue::from_str(challenge) {
            response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
        }
    }

    if let ApiError::Throttled { wait } = err {
        let secs = secs_ceil(*wait).to_string();
        if let Ok(value) = header::HeaderValue::from_str(&secs) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }

    response
}
