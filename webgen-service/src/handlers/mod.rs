//! HTTP handlers for the webgen service.

pub mod generate;
pub mod health;
pub mod metrics;
