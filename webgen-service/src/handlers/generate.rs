//! `POST /generate`: prompt in, composed page out.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use anyhow::Context;
use serde_json::Map;
use std::time::Instant;

use crate::models::{GenerationRequest, GenerationResponse};
use crate::services::{extractor, metrics, prompt};
use crate::AppState;
use service_core::error::AppError;

pub const MISSING_PROMPT: &str = "Missing \"prompt\" in request body";

/// Generate a page - implementation.
///
/// Validates the request, calls the text provider with the augmented prompt
/// and splits the answer into fragments.
#[tracing::instrument(
    skip(state, req),
    fields(model = tracing::field::Empty, prompt_len = tracing::field::Empty)
)]
pub async fn generate_impl(
    state: &AppState,
    req: GenerationRequest,
) -> Result<GenerationResponse, AppError> {
    let user_prompt = req
        .prompt()
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!(MISSING_PROMPT)))?;

    let model = req
        .model
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(&state.config.models.default_model);
    let parameters = req.parameters.clone().unwrap_or_else(Map::new);

    let span = tracing::Span::current();
    span.record("model", model);
    span.record("prompt_len", user_prompt.len());

    let outbound = prompt::build_prompt(user_prompt);
    let model_label = metrics::model_label(model, &state.config.models.default_model);

    let started = Instant::now();
    let result = state
        .text_provider
        .generate(model, &outbound, &parameters)
        .await;
    metrics::record_provider_latency(model_label, started.elapsed().as_secs_f64());

    let raw = match result {
        Ok(raw) => raw,
        Err(e) => {
            metrics::record_generation(model_label, e.kind());
            return Err(AppError::InternalError(
                anyhow::Error::new(e).context(format!("Generation with model '{}' failed", model)),
            ));
        }
    };

    tracing::debug!(raw = %raw, "Provider output");

    let fragments = extractor::extract(&raw);
    tracing::debug!(html = %fragments.html, "Extracted HTML");
    tracing::debug!(css = %fragments.css, "Extracted CSS");
    tracing::debug!(js = %fragments.js, "Extracted JavaScript");

    metrics::record_fragment_size("html", fragments.html.len());
    metrics::record_fragment_size("css", fragments.css.len());
    metrics::record_fragment_size("js", fragments.js.len());
    metrics::record_generation(model_label, "ok");

    let complete_html = extractor::escape_html(&extractor::compose(&fragments));

    tracing::info!(
        html_len = fragments.html.len(),
        css_len = fragments.css.len(),
        js_len = fragments.js.len(),
        "Page generated"
    );

    Ok(GenerationResponse {
        complete_html,
        fragments,
    })
}

/// REST handler. Body decoding failures are unhandled errors (500), not
/// validation errors.
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let Json(req) = payload
        .map_err(anyhow::Error::new)
        .context("Failed to decode request body")?;

    generate_impl(&state, req).await.map(Json)
}
