//! CodeIntel Library
//!
//! Snippet review service: validates a submitted code snippet, asks an LLM
//! provider for a structured review, stores the result and serves it back
//! together with the browser UI.

use std::sync::Arc;

pub mod config;
pub mod db;
pub mod embedded;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::Config;
pub use services::{AnalysisRepository, AnalysisService, CodeReviewer, LLMClient, LLMError};
pub use utils::{ApiError, ApiResult};

/// Application shared state
///
/// Services are wrapped in Arc for cheap cloning across handlers.
#[derive(Clone)]
pub struct AppState {
    pub static_config: config::StaticConfig,
    pub analysis_service: Arc<AnalysisService>,
}
