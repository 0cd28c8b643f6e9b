//! Tagged error shape for backend calls and exchange retry classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Device-flow error codes that end a login attempt.
///
/// Any other code arriving with a 4xx status (`authorization_pending`,
/// `slow_down`) is polled again. A 4xx without a code is not.
pub const TERMINAL_EXCHANGE_CODES: &[&str] = &[
    "expired_token",
    "access_denied",
    "invalid_request",
    "invalid_grant",
    "invalid_client",
    "unsupported_grant_type",
    "incorrect_device_code",
    "bad_verification_code",
];

/// Structured error body returned by the backend.
///
/// The backend reports the device-flow error code in `detail`. Some
/// responses also carry a generic `code`; `detail` wins when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiErrorPayload {
    /// Payload carrying only a device-flow error code.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            detail: Some(code.into()),
            ..Self::default()
        }
    }

    /// Device-flow error code, preferring `detail` over `code`.
    pub fn code(&self) -> Option<&str> {
        self.detail.as_deref().or(self.code.as_deref())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.code.is_none() && self.detail.is_none() && self.message.is_none()
    }
}

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifiedError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("API error (status {status}): {}", describe_body(.body))]
    HttpStatus {
        status: u16,
        body: Option<ApiErrorPayload>,
    },

    /// Anything else, e.g. a success status with an unreadable body.
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

/// How the polling loop treats an exchange failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Expected to resolve with time; poll again.
    Transient,
    /// Expired, denied or malformed; stop.
    Terminal,
    /// Not recognized; stop rather than loop on an unknown condition.
    Unclassifiable,
}

impl ClassifiedError {
    pub fn http(status: u16, body: Option<ApiErrorPayload>) -> Self {
        Self::HttpStatus { status, body }
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured payload, when the backend sent a readable one.
    pub fn payload(&self) -> Option<&ApiErrorPayload> {
        match self {
            Self::HttpStatus { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Device-flow error code from the payload.
    pub fn code(&self) -> Option<&str> {
        self.payload().and_then(ApiErrorPayload::code)
    }

    /// Classify this error as an exchange failure.
    ///
    /// Only a 4xx carrying a readable, non-terminal code is transient.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HttpStatus { status, .. } if (400..500).contains(status) => {
                match self.code() {
                    Some(code) if TERMINAL_EXCHANGE_CODES.contains(&code) => ErrorKind::Terminal,
                    Some(_) => ErrorKind::Transient,
                    None => ErrorKind::Unclassifiable,
                }
            }
            Self::HttpStatus { .. } | Self::Transport(_) | Self::Unknown(_) => {
                ErrorKind::Unclassifiable
            }
        }
    }
}

/// Whether a failed device-code exchange should be attempted again.
pub fn is_exchange_error_retryable(error: &ClassifiedError) -> bool {
    error.kind() == ErrorKind::Transient
}

impl From<reqwest::Error> for ClassifiedError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Unknown(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

fn describe_body(body: &Option<ApiErrorPayload>) -> String {
    let Some(body) = body else {
        return "no details".to_string();
    };
    match (body.message.as_deref(), body.code()) {
        (Some(message), Some(code)) => format!("{message} ({code})"),
        (Some(text), None) | (None, Some(text)) => text.to_string(),
        (None, None) => "no details".to_string(),
    }
}
