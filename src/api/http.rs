//! `reqwest` client for the backend endpoints.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{AuthorizationApi, DeviceAuthApi};
use crate::auth::device_code::{DeviceAuthorization, ExchangeSuccess};
use crate::config::ClientConfig;
use crate::error::{ApiErrorPayload, ClassifiedError, DeviceAuthError};
use crate::permissions::AuthorizationCheck;

const DEFAULT_DEVICE_PATH: &str = "/api/v2/users/oauth2/github/device";
const DEFAULT_CALLBACK_PATH: &str = "/api/v2/users/oauth2/github/callback";
const DEFAULT_AUTHCHECK_PATH: &str = "/api/v2/authcheck";
const SESSION_TOKEN_HEADER: &str = "coder-session-token";

/// HTTP implementation of [`DeviceAuthApi`] and [`AuthorizationApi`].
///
/// # Example
/// ```no_run
/// use device_auth::api::{DeviceAuthApi, HttpApiClient};
/// use device_auth::config::ClientConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpApiClient::new(ClientConfig::new("https://coder.example.com"))?;
/// let device = client.request_device_code().await?;
/// println!("Enter {} at {}", device.user_code, device.verification_uri);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    config: ClientConfig,
    device_path: String,
    callback_path: String,
    authcheck_path: String,
}

impl HttpApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, DeviceAuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(default_headers(&config)?)
            .build()
            .map_err(|err| DeviceAuthError::Configuration(format!("HTTP client: {err}")))?;
        Ok(Self {
            client,
            config,
            device_path: DEFAULT_DEVICE_PATH.to_string(),
            callback_path: DEFAULT_CALLBACK_PATH.to_string(),
            authcheck_path: DEFAULT_AUTHCHECK_PATH.to_string(),
        })
    }

    pub fn with_device_path(mut self, path: impl Into<String>) -> Self {
        self.device_path = path.into();
        self
    }

    pub fn with_callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = path.into();
        self
    }

    pub fn with_authcheck_path(mut self, path: impl Into<String>) -> Self {
        self.authcheck_path = path.into();
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl DeviceAuthApi for HttpApiClient {
    async fn request_device_code(&self) -> Result<DeviceAuthorization, ClassifiedError> {
        let url = self.config.endpoint(&self.device_path);
        tracing::debug!(%url, "requesting device code");
        let resp = self.client.get(&url).send().await?;
        decode(resp).await
    }

    async fn exchange_device_code(
        &self,
        device_code: &str,
        state: &str,
    ) -> Result<ExchangeSuccess, ClassifiedError> {
        let url = self.config.endpoint(&self.callback_path);
        let resp = self
            .client
            .get(&url)
            .query(&[("device_code", device_code), ("state", state)])
            .send()
            .await?;
        decode(resp).await
    }
}

#[async_trait]
impl AuthorizationApi for HttpApiClient {
    async fn check_authorization(
        &self,
        checks: &BTreeMap<String, AuthorizationCheck>,
    ) -> Result<HashMap<String, bool>, ClassifiedError> {
        #[derive(Serialize)]
        struct AuthorizationRequest<'a> {
            checks: &'a BTreeMap<String, AuthorizationCheck>,
        }

        let url = self.config.endpoint(&self.authcheck_path);
        let resp = self
            .client
            .post(&url)
            .json(&AuthorizationRequest { checks })
            .send()
            .await?;
        decode(resp).await
    }
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap, DeviceAuthError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(token) = &config.session_token {
        let mut value = HeaderValue::from_str(token).map_err(|_| {
            DeviceAuthError::Configuration("session token is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(SESSION_TOKEN_HEADER, value);
    }
    Ok(headers)
}

/// Map a response to its JSON body or a classified error.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClassifiedError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        let payload = match serde_json::from_str::<ApiErrorPayload>(&body) {
            Ok(payload) if !payload.is_empty() => Some(payload),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(status = status.as_u16(), error = %err, "unreadable error body");
                None
            }
        };
        return Err(ClassifiedError::http(status.as_u16(), payload));
    }
    serde_json::from_str(&body)
        .map_err(|err| ClassifiedError::Unknown(format!("invalid response body: {err}")))
}
