//! Error types and handling for the Gemini proxy.
//!
//! This module provides a unified error type [`AppError`] that wraps the
//! failure sources of the proxy handler and renders them as JSON responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::error::Error as _;
use thiserror::Error;

/// Label used for every failure that is not a more specific error.
pub const ERROR_LABEL_INTERNAL: &str = "Internal Server Error";
/// Label used when the upstream body cannot be parsed as JSON.
pub const ERROR_LABEL_INVALID_JSON: &str = "Invalid JSON Response";
/// Message used when the upstream body cannot be parsed as JSON.
pub const INVALID_JSON_MESSAGE: &str = "Failed to parse Gemini API response";
/// Label used when the inbound body is rejected.
pub const ERROR_LABEL_BAD_REQUEST: &str = "Bad Request";

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request errors from the reqwest client
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    /// Inbound body could not be parsed as JSON
    #[error("{0}")]
    BadRequest(String),

    /// Upstream answered with a body that is not JSON
    #[error("Failed to parse Gemini API response")]
    InvalidJsonResponse { response_text: String },

    /// Generic internal server errors with custom message
    #[error("{0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Diagnostic trace: the debug rendering followed by the source chain.
    pub fn trace(&self) -> String {
        let mut trace = format!("{:?}", self);
        let mut source = self.source();
        while let Some(cause) = source {
            trace.push_str("\ncaused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }
        trace
    }

    /// Render the error as a JSON response.
    ///
    /// The diagnostic trace is only attached to generic failures and only
    /// when `include_trace` is set.
    pub fn into_error_response(self, include_trace: bool) -> Response {
        let status = self.status();
        let body = match self {
            AppError::InvalidJsonResponse { response_text } => ErrorBody {
                error: ERROR_LABEL_INVALID_JSON,
                message: INVALID_JSON_MESSAGE.to_string(),
                response_text: Some(response_text),
                stack: None,
            },
            AppError::BadRequest(message) => ErrorBody {
                error: ERROR_LABEL_BAD_REQUEST,
                message,
                response_text: None,
                stack: None,
            },
            other => ErrorBody {
                error: ERROR_LABEL_INTERNAL,
                message: other.to_string(),
                response_text: None,
                stack: include_trace.then(|| other.trace()),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_error_response(false)
    }
}

/// Convenience type alias for Results using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = AppError::Internal("test error".to_string());
        assert_eq!(err.to_string(), "test error");

        let err = AppError::InvalidJsonResponse {
            response_text: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse Gemini API response");
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let err = AppError::InvalidJsonResponse {
            response_text: "not json".to_string(),
        };
        let response = err.into_error_response(true);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "error": "Invalid JSON Response",
                "message": "Failed to parse Gemini API response",
                "responseText": "not json"
            })
        );
    }

    #[tokio::test]
    async fn test_internal_error_without_trace() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Internal Server Error", "message": "boom"})
        );
    }

    #[tokio::test]
    async fn test_internal_error_with_trace() {
        let response = AppError::Internal("boom".to_string()).into_error_response(true);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal Server Error");
        assert_eq!(body["message"], "boom");
        assert!(body["stack"].as_str().unwrap().contains("Internal(\"boom\")"));
    }

    #[tokio::test]
    async fn test_bad_request_response() {
        let response = AppError::BadRequest("expected value".to_string()).into_error_response(true);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Bad Request");
        assert!(body.get("stack").is_none());
    }

    #[test]
    fn test_trace_includes_source_chain() {
        let json_err = serde_json::from_str::<Value>("{\"a\":").unwrap_err();
        let cause = json_err.to_string();
        let trace = AppError::from(json_err).trace();
        assert!(trace.starts_with("Serialization("));
        assert!(trace.contains(&format!("\ncaused by: {}", cause)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<Value>("invalid").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Serialization(_)));
        assert_eq!(app_err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
