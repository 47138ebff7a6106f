#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use service_core::config::Config;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use webgen_service::config::{GeminiSettings, ModelConfig, WebgenConfig, DEFAULT_MODEL};
use webgen_service::services::providers::TextProvider;
use webgen_service::AppState;

/// Configuration that binds a random local port and never talks to Google.
pub fn test_config() -> WebgenConfig {
    WebgenConfig {
        common: Config {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
        },
        gemini: GeminiSettings {
            api_key: "test-api-key".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 5,
        },
        models: ModelConfig {
            default_model: DEFAULT_MODEL.to_string(),
        },
        otlp_endpoint: None,
    }
}

pub fn test_state(provider: Arc<dyn TextProvider>) -> AppState {
    AppState::new(test_config(), provider)
}

pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
