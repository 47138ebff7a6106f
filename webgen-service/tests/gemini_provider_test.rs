//! Gemini provider against a local mock of the Generative Language API.

use serde_json::{json, Map, Value};
use std::time::Duration;
use webgen_service::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use webgen_service::services::providers::{ProviderError, TextProvider};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer, timeout: Duration) -> GeminiTextProvider {
    GeminiTextProvider::new(GeminiConfig {
        api_key: "test-key".to_string(),
        base_url: format!("{}/v1beta", server.uri()),
        timeout,
    })
    .expect("client builds")
}

fn text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5 }
    })
}

#[tokio::test]
async fn generate_returns_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "make a page" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("<p>page</p>")))
        .expect(1)
        .mount(&server)
        .await;

    let text = provider(&server, Duration::from_secs(5))
        .generate("gemini-1.5-flash", "make a page", &Map::new())
        .await
        .unwrap();

    assert_eq!(text, "<p>page</p>");
}

#[tokio::test]
async fn parameters_become_generation_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": { "temperature": 0.1, "maxOutputTokens": 256 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let parameters = json!({
        "temperature": 0.1,
        "generation_config": { "max_output_tokens": 256 }
    });

    let text = provider(&server, Duration::from_secs(5))
        .generate(
            "models/gemini-1.5-pro",
            "p",
            parameters.as_object().unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(text, "ok");
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_secs(5))
        .generate("gemini-1.5-flash", "p", &Map::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited));
}

#[tokio::test]
async fn api_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("{\"error\":{\"message\":\"API key not valid\"}}"),
        )
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_secs(5))
        .generate("gemini-1.5-flash", "p", &Map::new())
        .await
        .unwrap_err();

    match err {
        ProviderError::ApiError(msg) => {
            assert!(msg.contains("400"));
            assert!(msg.contains("API key not valid"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unknown_parameter_never_reaches_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .expect(0)
        .mount(&server)
        .await;

    let parameters = json!({ "not_a_real_option": true });
    let err = provider(&server, Duration::from_secs(5))
        .generate("gemini-1.5-flash", "p", parameters.as_object().unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidRequest(_)));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response("late"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_millis(200))
        .generate("gemini-1.5-flash", "p", &Map::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Timeout));
}

#[tokio::test]
async fn empty_api_key_is_not_configured() {
    let server = MockServer::start().await;
    let provider = GeminiTextProvider::new(GeminiConfig {
        api_key: String::new(),
        base_url: server.uri(),
        timeout: Duration::from_secs(1),
    })
    .unwrap();

    assert!(matches!(
        provider.health_check().await,
        Err(ProviderError::NotConfigured(_))
    ));
    assert!(matches!(
        provider.generate("gemini-1.5-flash", "p", &Map::new()).await,
        Err(ProviderError::NotConfigured(_))
    ));
}

#[tokio::test]
async fn model_cannot_select_another_api_method() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("unexpected")))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server, Duration::from_secs(5))
        .generate(
            "gemini-1.5-flash:streamGenerateContent?alt=json#",
            "p",
            &Map::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidRequest(_)));
}
