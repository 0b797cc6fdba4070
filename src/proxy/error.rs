use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("Query parameter \"q\" is required")]
    MissingQuery,
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("Lyrics API error: status {status}")]
    Upstream { status: u16, details: Value },
    #[error("No response from lyrics API: {0}")]
    Unreachable(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl LyricsError {
    pub fn status(&self) -> StatusCode {
        match self {
            LyricsError::MissingQuery => StatusCode::BAD_REQUEST,
            LyricsError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            LyricsError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            LyricsError::Unreachable(_) => StatusCode::GATEWAY_TIMEOUT,
            LyricsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            LyricsError::MissingQuery => json!({ "error": self.to_string() }),
            LyricsError::RateLimited { retry_after } => json!({
                "error": "Rate limit exceeded",
                "details": "Too many requests to the lyrics service. Please try again in a few minutes.",
                "retryAfter": retry_after,
            }),
            LyricsError::Upstream { details, .. } => json!({
                "error": "Lyrist API error",
                "details": details,
            }),
            LyricsError::Unreachable(_) => json!({
                "error": "No response from Lyrist API",
                "details": "The request timed out or the server is not responding",
            }),
            LyricsError::Internal(message) => json!({
                "error": "Internal server error",
                "details": message,
            }),
        }
    }
}

/// Reads a `retry-after` value in seconds; dates and garbage fall back to
/// the default.
pub fn parse_retry_after(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

impl IntoResponse for LyricsError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.body())).into_response();
        if let LyricsError::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}
