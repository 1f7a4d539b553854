use thiserror::Error;

use crate::session::SessionError;
use crate::store::StoreError;
use crate::utils::format::FormatError;

/// Failures the controllers can run into.
///
/// None of these escape an event handler: validation failures are alerted,
/// the rest are logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(#[from] StoreError),

    #[error("Parse error: {0}")]
    Parse(#[from] FormatError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("No store configured")]
    NoStore,

    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No async runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    pub fn missing_element(test_id: &str) -> Self {
        AppError::MissingElement(test_id.to_string())
    }
}
