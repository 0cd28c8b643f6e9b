//! Error types for device-auth.

pub mod classified;

pub use classified::{is_exchange_error_retryable, ApiErrorPayload, ClassifiedError, ErrorKind};

use thiserror::Error;

/// Crate-level error for configuration, I/O and login failures.
#[derive(Error, Debug)]
pub enum DeviceAuthError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing OAuth2 state")]
    MissingState,

    #[error("Request failed: {0}")]
    Request(#[from] ClassifiedError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Login canceled")]
    Canceled,
}

impl From<serde_json::Error> for DeviceAuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for DeviceAuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, DeviceAuthError>;
