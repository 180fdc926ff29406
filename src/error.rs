//! Error types for the Omni Nexus backend

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, NexusError>;

#[derive(Error, Debug)]
pub enum NexusError {

    // =============================
    // Upstream Service Errors
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Sienge error: {0}")]
    SiengeError(String),

    // =============================
    // Local Errors
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl NexusError {
    /// HTTP status an API handler should answer with for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            NexusError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            NexusError::LlmError(_)
            | NexusError::SiengeError(_)
            | NexusError::HttpError(_) => StatusCode::BAD_GATEWAY,
            NexusError::ConfigError(_) | NexusError::SerializationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
