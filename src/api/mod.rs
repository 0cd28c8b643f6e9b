//! Backend API seams.
//!
//! Every call returns a [`ClassifiedError`] on failure so callers decide on
//! retries from the error shape alone.

pub mod http;

pub use http::HttpApiClient;

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::auth::device_code::{DeviceAuthorization, ExchangeSuccess};
use crate::error::ClassifiedError;
use crate::permissions::AuthorizationCheck;

/// Device authorization endpoints of the backend.
#[async_trait]
pub trait DeviceAuthApi: Send + Sync {
    /// Ask the backend for a new device code.
    async fn request_device_code(&self) -> Result<DeviceAuthorization, ClassifiedError>;

    /// Exchange a device code for a session.
    async fn exchange_device_code(
        &self,
        device_code: &str,
        state: &str,
    ) -> Result<ExchangeSuccess, ClassifiedError>;
}

/// Authorization-check endpoint of the backend.
#[async_trait]
pub trait AuthorizationApi: Send + Sync {
    /// Ask the backend to answer each named check.
    async fn check_authorization(
        &self,
        checks: &BTreeMap<String, AuthorizationCheck>,
    ) -> Result<HashMap<String, bool>, ClassifiedError>;
}
