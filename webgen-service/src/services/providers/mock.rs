//! Mock provider implementation for testing.

use super::{ProviderError, TextProvider};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Mutex;

/// One recorded call to [`MockTextProvider::generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub parameters: Map<String, Value>,
}

enum Reply {
    Text(String),
    Fail(fn() -> ProviderError),
}

/// Mock text provider returning a canned reply.
pub struct MockTextProvider {
    reply: Reply,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTextProvider {
    /// Always answer with `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with the error built by `make_error`.
    pub fn failing(make_error: fn() -> ProviderError) -> Self {
        Self {
            reply: Reply::Fail(make_error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        parameters: &Map<String, Value>,
    ) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                model: model.to_string(),
                prompt: prompt.to_string(),
                parameters: parameters.clone(),
            });
        }

        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(make_error) => Err(make_error()),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.reply {
            Reply::Text(_) => Ok(()),
            Reply::Fail(make_error) => Err(make_error()),
        }
    }
}
