use service_core::observability::init_tracing;
use webgen_service::config::WebgenConfig;
use webgen_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = WebgenConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing("webgen-service", "info", config.otlp_endpoint.as_deref());

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
