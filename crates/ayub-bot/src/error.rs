//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Gateway error: {0}")]
    Gateway(#[from] wa_client::WaError),

    #[error("AI error: {0}")]
    Ai(#[from] ai_client::AiError),

    #[error("Config store error: {0}")]
    ConfigStore(#[from] group_config::ConfigStoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
