//! Domain models for the webgen service.

pub mod generation;

pub use generation::{ExtractedFragments, GenerationRequest, GenerationResponse};
