//! Text generation provider abstraction.
//!
//! The handler only depends on [`TextProvider`], so the real Gemini backend
//! can be swapped for a deterministic mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Response contained no text")]
    EmptyResponse,

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::Timeout => "timeout",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// Generates raw text from a prompt.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a completion for `prompt` with the given model.
    ///
    /// `parameters` are provider-specific generation options supplied by the
    /// caller.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        parameters: &Map<String, Value>,
    ) -> Result<String, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
