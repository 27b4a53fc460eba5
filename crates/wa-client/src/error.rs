//! WhatsApp gateway client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Attachment error: {0}")]
    Attachment(String),
}
