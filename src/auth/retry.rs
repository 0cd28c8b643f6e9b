//! Retry schedule for the device-code exchange.
//!
//! The delay is the server-advised interval, held constant across attempts.
//! Whether to retry at all is decided by [`is_exchange_error_retryable`].

use std::time::Duration;

use crate::error::{is_exchange_error_retryable, ClassifiedError};

use super::device_code::DeviceAuthorization;

/// Delay used when the backend does not advise an interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polling policy configuration.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay used when the device authorization carries no interval.
    pub fallback_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            fallback_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    /// Delay before the next exchange attempt for `device`.
    pub fn delay_for(&self, device: &DeviceAuthorization) -> Duration {
        device
            .interval
            .map(Duration::from_secs)
            .unwrap_or(self.fallback_interval)
    }

    /// Whether polling continues after `error`.
    pub fn should_retry(&self, error: &ClassifiedError) -> bool {
        is_exchange_error_retryable(error)
    }
}
