//! device-auth — OAuth2 device-authorization login client
//!
//! Requests a device code from the backend, polls the exchange endpoint on
//! the advised interval, and hands the redirect URL to a [`auth::Navigator`]
//! once the user has authorized the device. Also shapes organization
//! permission checks for the backend's authorization endpoint.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use device_auth::prelude::*;
//! use device_auth::auth::RecordingNavigator;
//!
//! # async fn example() -> device_auth::error::Result<()> {
//! let api = Arc::new(HttpApiClient::new(ClientConfig::from_env()?)?);
//! let controller = DeviceAuthController::new(api, Arc::new(RecordingNavigator::new()));
//! let mut login = controller.start(Some("oauth-state".to_string()));
//! let redirect_url = login.wait().await.into_result()?;
//! println!("{redirect_url}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod permissions;
pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
