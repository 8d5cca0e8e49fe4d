//! Error types for the machine translation crate

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Bad provider configuration or a request the service refused
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Translation error: {0}")]
    TranslationError(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

impl From<reqwest::Error> for MtError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MtError::NetworkError(format!("request timed out: {}", e))
        } else {
            MtError::NetworkError(e.to_string())
        }
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
