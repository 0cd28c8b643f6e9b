#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use device_auth::api::DeviceAuthApi;
use device_auth::auth::{DeviceAuthorization, ExchangeSuccess};
use device_auth::error::{ApiErrorPayload, ClassifiedError};
use tokio::time::Instant;

/// Exchange attempt seen by [`ScriptedApi`].
#[derive(Debug, Clone)]
pub struct ExchangeCall {
    pub at: Instant,
    pub device_code: String,
    pub state: String,
}

/// Device API that replays scripted answers.
///
/// Once the exchange script runs out every attempt answers
/// `authorization_pending`.
pub struct ScriptedApi {
    device: Result<DeviceAuthorization, ClassifiedError>,
    exchanges: Mutex<VecDeque<Result<ExchangeSuccess, ClassifiedError>>>,
    device_calls: AtomicUsize,
    exchange_calls: Mutex<Vec<ExchangeCall>>,
}

impl ScriptedApi {
    pub fn new(device: Result<DeviceAuthorization, ClassifiedError>) -> Self {
        Self {
            device,
            exchanges: Mutex::new(VecDeque::new()),
            device_calls: AtomicUsize::new(0),
            exchange_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_exchanges(
        self,
        answers: impl IntoIterator<Item = Result<ExchangeSuccess, ClassifiedError>>,
    ) -> Self {
        self.exchanges
            .lock()
            .expect("script lock poisoned")
            .extend(answers);
        self
    }

    pub fn device_calls(&self) -> usize {
        self.device_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> Vec<ExchangeCall> {
        self.exchange_calls
            .lock()
            .expect("calls lock poisoned")
            .clone()
    }

    pub fn exchange_count(&self) -> usize {
        self.exchange_calls.lock().expect("calls lock poisoned").len()
    }
}

#[async_trait]
impl DeviceAuthApi for ScriptedApi {
    async fn request_device_code(&self) -> Result<DeviceAuthorization, ClassifiedError> {
        self.device_calls.fetch_add(1, Ordering::SeqCst);
        self.device.clone()
    }

    async fn exchange_device_code(
        &self,
        device_code: &str,
        state: &str,
    ) -> Result<ExchangeSuccess, ClassifiedError> {
        self.exchange_calls
            .lock()
            .expect("calls lock poisoned")
            .push(ExchangeCall {
                at: Instant::now(),
                device_code: device_code.to_string(),
                state: state.to_string(),
            });
        self.exchanges
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(pending()))
    }
}

pub fn device(interval: Option<u64>) -> DeviceAuthorization {
    DeviceAuthorization {
        device_code: "device-code-1".to_string(),
        user_code: "ABCD-EFGH".to_string(),
        verification_uri: "https://github.com/login/device".to_string(),
        interval,
        expires_in: 900,
    }
}

pub fn coded(status: u16, code: &str) -> ClassifiedError {
    ClassifiedError::http(status, Some(ApiErrorPayload::with_code(code)))
}

pub fn pending() -> ClassifiedError {
    coded(400, "authorization_pending")
}

pub fn success(redirect_url: &str) -> ExchangeSuccess {
    ExchangeSuccess {
        redirect_url: redirect_url.to_string(),
    }
}
