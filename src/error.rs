//! Error types for the stock advisor

use thiserror::Error;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Domain Errors
    // =============================

    #[error("Model API error: {0}")]
    ApiError(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
