pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use config::WebgenConfig;
use services::providers::TextProvider;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WebgenConfig>,
    pub text_provider: Arc<dyn TextProvider>,
}

impl AppState {
    pub fn new(config: WebgenConfig, text_provider: Arc<dyn TextProvider>) -> Self {
        Self {
            config: Arc::new(config),
            text_provider,
        }
    }
}
