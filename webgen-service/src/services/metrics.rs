//! Prometheus metrics for webgen-service.
//!
//! Provides HTTP and generation-specific metrics for observability.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;
use std::time::Instant;

/// Registry plus every metric registered in it.
pub struct Metrics {
    pub registry: Registry,
    // HTTP metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
    // Generation metrics
    pub generations_total: IntCounterVec,
    pub provider_latency_seconds: HistogramVec,
    pub fragment_bytes: HistogramVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Model names recorded under their own label value.
const KNOWN_MODELS: &[&str] = &[
    "gemini-1.5-flash",
    "gemini-1.5-flash-8b",
    "gemini-1.5-pro",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
];

/// Label value for a requested model.
///
/// The model comes from the request body, so anything other than the
/// configured default or a known model collapses into `"other"`.
pub fn model_label<'a>(model: &'a str, default_model: &'a str) -> &'a str {
    let model = model.strip_prefix("models/").unwrap_or(model);
    let default_model = default_model
        .strip_prefix("models/")
        .unwrap_or(default_model);

    if model == default_model || KNOWN_MODELS.contains(&model) {
        model
    } else {
        "other"
    }
}

/// Initialize all metrics. Called at startup; later calls are no-ops.
pub fn init_metrics() {
    METRICS.get_or_init(|| {
        let metrics = Metrics::new();
        tracing::info!("Prometheus metrics initialized");
        metrics
    });
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("Failed to create http_requests_total metric");

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &["method", "path"],
        )
        .expect("Failed to create http_request_duration_seconds metric");

        // outcome: "ok" or a ProviderError kind
        let generations = IntCounterVec::new(
            Opts::new("webgen_generations_total", "Total page generation requests"),
            &["model", "outcome"],
        )
        .expect("Failed to create webgen_generations_total metric");

        let provider_latency = HistogramVec::new(
            HistogramOpts::new(
                "webgen_provider_latency_seconds",
                "Generation provider API latency in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["model"],
        )
        .expect("Failed to create webgen_provider_latency_seconds metric");

        let fragment_bytes = HistogramVec::new(
            HistogramOpts::new(
                "webgen_fragment_bytes",
                "Size of extracted html/css/js fragments in bytes",
            )
            .buckets(prometheus::exponential_buckets(64.0, 4.0, 8).unwrap_or_default()),
            &["fragment"],
        )
        .expect("Failed to create webgen_fragment_bytes metric");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("Failed to register http_requests_total");
        registry
            .register(Box::new(http_request_duration.clone()))
            .expect("Failed to register http_request_duration_seconds");
        registry
            .register(Box::new(generations.clone()))
            .expect("Failed to register webgen_generations_total");
        registry
            .register(Box::new(provider_latency.clone()))
            .expect("Failed to register webgen_provider_latency_seconds");
        registry
            .register(Box::new(fragment_bytes.clone()))
            .expect("Failed to register webgen_fragment_bytes");

        Self {
            registry,
            http_requests_total,
            http_request_duration_seconds: http_request_duration,
            generations_total: generations,
            provider_latency_seconds: provider_latency,
            fragment_bytes,
        }
    }
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match METRICS.get() {
        Some(m) => &m.registry,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Axum middleware recording request count and latency per route.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    // Route templates keep label cardinality bounded.
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    record_http_request(&method, &path, &status, start.elapsed().as_secs_f64());

    response
}

/// Record a completed HTTP request.
pub fn record_http_request(method: &str, path: &str, status: &str, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.http_requests_total
            .with_label_values(&[method, path, status])
            .inc();
        m.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }
}

/// Record the outcome of one generation request.
pub fn record_generation(model: &str, outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.generations_total.with_label_values(&[model, outcome]).inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(model: &str, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.provider_latency_seconds
            .with_label_values(&[model])
            .observe(duration_secs);
    }
}

/// Record the size of one extracted fragment.
pub fn record_fragment_size(fragment: &str, bytes: usize) {
    if let Some(m) = METRICS.get() {
        m.fragment_bytes
            .with_label_values(&[fragment])
            .observe(bytes as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_generation_shows_up_in_exposition() {
        init_metrics();
        record_generation("gemini-1.5-flash", "ok");

        let text = get_metrics();
        assert!(text.contains("webgen_generations_total"));
        assert!(text.contains("model=\"gemini-1.5-flash\""));
    }

    #[test]
    fn model_label_is_bounded() {
        assert_eq!(model_label("gemini-1.5-pro", "gemini-1.5-flash"), "gemini-1.5-pro");
        assert_eq!(
            model_label("models/gemini-1.5-flash", "gemini-1.5-flash"),
            "gemini-1.5-flash"
        );
        assert_eq!(model_label("my-tuned-model", "my-tuned-model"), "my-tuned-model");
        assert_eq!(model_label("attacker-1", "gemini-1.5-flash"), "other");
        assert_eq!(model_label("attacker-2", "gemini-1.5-flash"), "other");
    }
}
