use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Full cause chain of an unhandled error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl AppError {
    /// Status code and body this error is rendered as.
    pub fn to_parts(&self) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, body(err.to_string())),
            // Unhandled errors surface their message plus the "Caused by" chain.
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: format!("{:#}", err),
                    details: None,
                    traceback: Some(format!("{:?}", err)),
                },
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Configuration error".to_string(),
                    details: Some(err.to_string()),
                    traceback: None,
                },
            ),
        }
    }
}

fn body(error: String) -> ErrorResponse {
    ErrorResponse {
        error,
        details: None,
        traceback: None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_parts();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %body.error, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %body.error, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn bad_request_body_carries_only_message() {
        let err = AppError::BadRequest(anyhow::anyhow!("Missing \"prompt\" in request body"));
        let (status, body) = err.to_parts();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": "Missing \"prompt\" in request body" })
        );
    }

    #[test]
    fn internal_error_includes_traceback_chain() {
        let source: Result<(), std::io::Error> = Err(std::io::Error::other("connection reset"));
        let err = AppError::from(source.context("Gemini request failed").unwrap_err());
        let (status, body) = err.to_parts();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Gemini request failed: connection reset");
        let traceback = body.traceback.expect("traceback present");
        assert!(traceback.contains("Caused by"));
        assert!(traceback.contains("connection reset"));
    }

    #[test]
    fn config_error_is_reported_with_details() {
        let err = AppError::ConfigError(anyhow::anyhow!("GEMINI_API_KEY is required but not set"));
        let (status, body) = err.to_parts();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Configuration error");
        assert_eq!(
            body.details.as_deref(),
            Some("GEMINI_API_KEY is required but not set")
        );
    }
}
