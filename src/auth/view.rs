//! Presentation model for the device login page.

use super::controller::{LoginFailure, LoginStatus};
use super::device_code::DeviceAuthorization;
use crate::error::ClassifiedError;

/// Redirect target shown before the exchange succeeds.
pub const DEFAULT_REDIRECT_URL: &str = "/";

/// What a login page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginPage {
    /// Rendered when no OAuth2 state was supplied.
    MissingState,
    Device(LoginView),
}

/// Inputs of the device login view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginView {
    pub authenticated: bool,
    pub redirect_url: String,
    pub device_exchange_error: Option<ClassifiedError>,
    pub external_auth_device: Option<DeviceAuthorization>,
}

impl LoginPage {
    pub fn from_status(status: &LoginStatus) -> Self {
        let (exchange_error, device_code_error) = match status {
            LoginStatus::MissingState => return Self::MissingState,
            LoginStatus::Polling { polling, .. } => (polling.last_error.as_ref(), None),
            LoginStatus::Failed(LoginFailure::Exchange { error, .. }) => (Some(error), None),
            LoginStatus::Failed(LoginFailure::DeviceCode(error)) => (None, Some(error)),
            _ => (None, None),
        };
        let redirect_url = match status {
            LoginStatus::Succeeded { redirect_url, .. } => redirect_url.clone(),
            _ => DEFAULT_REDIRECT_URL.to_string(),
        };
        Self::Device(LoginView {
            authenticated: matches!(status, LoginStatus::Succeeded { .. }),
            redirect_url,
            device_exchange_error: most_specific_error(exchange_error, device_code_error).cloned(),
            external_auth_device: status.device().cloned(),
        })
    }

    pub fn view(&self) -> Option<&LoginView> {
        match self {
            Self::MissingState => None,
            Self::Device(view) => Some(view),
        }
    }
}

/// Prefer the exchange error over the device-code error.
pub fn most_specific_error<'a>(
    exchange: Option<&'a ClassifiedError>,
    device_code: Option<&'a ClassifiedError>,
) -> Option<&'a ClassifiedError> {
    exchange.or(device_code)
}
