//! Error types for the data-service boundary and the engine's public operations.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Errors raised by a data-service client (question bank, catalog, progress).
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The per-request timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The service returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_decode() {
            UpstreamError::Parse(e.to_string())
        } else {
            UpstreamError::Http(e)
        }
    }
}

/// Failures surfaced by `list_interests`, `get_quiz` and `submit_quiz`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Valid-looking request with no data behind it.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A data service was unreachable or answered with a non-2xx status.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A retrieval (or the whole quiz fan-out) exceeded its time bound.
    #[error("upstream timed out")]
    UpstreamTimeout,
}

impl From<UpstreamError> for EngineError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::Timeout => EngineError::UpstreamTimeout,
            other => EngineError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<JsonRejection> for EngineError {
    fn from(rejection: JsonRejection) -> Self {
        EngineError::InvalidInput(format!("malformed request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for EngineError {
    fn from(rejection: QueryRejection) -> Self {
        EngineError::InvalidInput(format!("malformed query string: {}", rejection.body_text()))
    }
}

impl EngineError {
    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::InvalidInput(_) => "INVALID_INPUT",
            EngineError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            EngineError::UpstreamTimeout => "UPSTREAM_TIMEOUT",
        }
    }

    /// Server-side failures the caller may retry; the rest are declined requests.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::UpstreamUnavailable(_) | EngineError::UpstreamTimeout)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_retryable() {
            warn!(target: "learnbuddy", %status, error = %self, "Upstream failure surfaced to caller");
        }
        let body = ErrorResponse { error: self.to_string(), code: self.code().into() };
        (status, Json(body)).into_response()
    }
}

/// Failures of the narration collaborator. Never surfaced to callers.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("narration disabled (no API key)")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("narration API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("narration returned no text")]
    Empty,
}

/// Bearer-token verification failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    Missing,

    #[error("invalid or expired token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token verification is not configured")]
    Disabled,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { error: self.to_string(), code: "UNAUTHORIZED".into() };
        (StatusCode::UNAUTHORIZED, [("WWW-Authenticate", "Bearer")], Json(body)).into_response()
    }
}

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(EngineError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(EngineError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(EngineError::UpstreamUnavailable("x".into()).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(EngineError::UpstreamTimeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn only_upstream_failures_are_retryable() {
        assert!(!EngineError::NotFound("x".into()).is_retryable());
        assert!(!EngineError::InvalidInput("x".into()).is_retryable());
        assert!(EngineError::UpstreamUnavailable("x".into()).is_retryable());
        assert!(EngineError::UpstreamTimeout.is_retryable());
    }

    #[test]
    fn upstream_timeout_maps_to_engine_timeout() {
        assert!(matches!(EngineError::from(UpstreamError::Timeout), EngineError::UpstreamTimeout));
        let api = UpstreamError::Api { status: 500, message: "boom".into() };
        assert!(matches!(EngineError::from(api), EngineError::UpstreamUnavailable(_)));
    }
}
