use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Device authorization issued by the backend for one login attempt.
///
/// # Example
/// ```
/// use device_auth::auth::DeviceAuthorization;
///
/// let device = DeviceAuthorization {
///     device_code: "device-code".to_string(),
///     user_code: "ABCD-EFGH".to_string(),
///     verification_uri: "https://github.com/login/device".to_string(),
///     interval: Some(5),
///     expires_in: 900,
/// };
/// assert!(device.expires_at(chrono::Utc::now()).is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAuthorization {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Minimum seconds between exchange attempts, when advised.
    #[serde(default)]
    pub interval: Option<u64>,
    /// Lifetime of the device code in seconds.
    pub expires_in: u64,
}

impl DeviceAuthorization {
    /// When the device code lapses, counted from `issued_at`.
    ///
    /// `None` when the advertised lifetime does not fit a timestamp.
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let lifetime = TimeDelta::try_seconds(i64::try_from(self.expires_in).ok()?)?;
        issued_at.checked_add_signed(lifetime)
    }
}

/// Successful device-code exchange.
///
/// The response also sets the session cookie, which is why callers must
/// follow `redirect_url` with a full navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSuccess {
    pub redirect_url: String,
}
