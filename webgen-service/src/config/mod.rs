use crate::services::providers::gemini::GEMINI_API_BASE;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Upper bound on a single outbound generation call.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct WebgenConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub models: ModelConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl GeminiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model for requests without an explicit `model` field.
    pub default_model: String,
}

impl WebgenConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let request_timeout_secs = get_env(
            "WEBGEN_REQUEST_TIMEOUT_SECS",
            Some(&DEFAULT_REQUEST_TIMEOUT_SECS.to_string()),
        )?;
        let request_timeout_secs = request_timeout_secs.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "WEBGEN_REQUEST_TIMEOUT_SECS must be a whole number of seconds: {}",
                e
            ))
        })?;

        Ok(WebgenConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: get_env("GEMINI_API_KEY", None)?,
                base_url: get_env("GEMINI_API_BASE", Some(GEMINI_API_BASE))?,
                request_timeout_secs,
            },
            models: ModelConfig {
                default_model: get_env("WEBGEN_DEFAULT_MODEL", Some(DEFAULT_MODEL))?,
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}
