//! Gemini AI provider implementation.
//!
//! Calls the `generateContent` REST method of Google's Generative Language
//! API. Caller parameters use the snake_case option names of the official
//! SDKs: generation options end up in `generationConfig`, `safety_settings`
//! in `safetySettings`, anything else is rejected.

use super::{ProviderError, TextProvider};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// A model name is a single path segment; `:`, `/`, `?` and `#` would let it
/// select another API method.
static MODEL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(models/)?[A-Za-z0-9._-]+$").expect("valid model name regex"));

fn validate_model(model: &str) -> Result<(), ProviderError> {
    if MODEL_NAME.is_match(model) {
        Ok(())
    } else {
        Err(ProviderError::InvalidRequest(format!(
            "Invalid model name '{}'",
            model
        )))
    }
}

/// Generation options accepted as top-level parameters.
const GENERATION_FIELDS: &[&str] = &[
    "temperature",
    "top_p",
    "top_k",
    "max_output_tokens",
    "candidate_count",
    "stop_sequences",
    "response_mime_type",
    "response_schema",
    "presence_penalty",
    "frequency_penalty",
    "seed",
];

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the given model and method.
    fn api_url(&self, model: &str, method: &str) -> String {
        // The SDK accepts both "gemini-1.5-flash" and "models/gemini-1.5-flash".
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            model,
            method
        )
    }
}

/// Map caller parameters onto a `generateContent` request body.
fn build_request(
    prompt: &str,
    parameters: &Map<String, Value>,
) -> Result<GenerateContentRequest, ProviderError> {
    let mut generation_config = Map::new();
    let mut safety_settings = None;

    for (key, value) in parameters {
        match key.as_str() {
            "generation_config" | "generationConfig" => {
                let fields = value.as_object().ok_or_else(|| {
                    ProviderError::InvalidRequest(format!(
                        "'{}' must be an object, got {}",
                        key, value
                    ))
                })?;
                for (field, v) in fields {
                    generation_config.insert(to_camel_case(field), v.clone());
                }
            }
            "safety_settings" | "safetySettings" => {
                safety_settings = Some(safety_settings_value(value)?);
            }
            field if GENERATION_FIELDS.contains(&field) => {
                generation_config.insert(to_camel_case(field), value.clone());
            }
            other => {
                return Err(ProviderError::InvalidRequest(format!(
                    "generate_content() got an unexpected parameter '{}'",
                    other
                )));
            }
        }
    }

    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(prompt.to_string()),
            }],
        }],
        generation_config: (!generation_config.is_empty()).then_some(generation_config),
        safety_settings,
    })
}

/// Accept either the REST list form or a `{category: threshold}` map.
fn safety_settings_value(value: &Value) -> Result<Value, ProviderError> {
    match value {
        Value::Array(_) => Ok(value.clone()),
        Value::Object(map) => Ok(Value::Array(
            map.iter()
                .map(|(category, threshold)| {
                    serde_json::json!({ "category": category, "threshold": threshold })
                })
                .collect(),
        )),
        other => Err(ProviderError::InvalidRequest(format!(
            "'safety_settings' must be a list or an object, got {}",
            other
        ))),
    }
}

fn to_camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Pull the generated text out of a response body.
fn response_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        tracing::warn!(block_reason = %reason, "Gemini blocked the prompt");
        return Err(ProviderError::ContentFiltered);
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ProviderError::ContentFiltered);
        }
        return Err(ProviderError::EmptyResponse);
    }

    Ok(text)
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        parameters: &Map<String, Value>,
    ) -> Result<String, ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        validate_model(model)?;
        let request = build_request(prompt, parameters)?;
        let url = self.api_url(model, "generateContent");

        tracing::debug!(
            model = %model,
            prompt_len = prompt.len(),
            parameter_count = parameters.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        response_text(api_response)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    safety_settings: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
