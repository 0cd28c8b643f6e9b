//! Device-authorization login controller.
//!
//! One login runs as a single task: request a device code, then exchange it
//! on the advised interval until it succeeds, fails for good, or the login is
//! torn down. Only the retry timer issues exchanges; focus events are
//! accepted and dropped because the exchange endpoint is strictly rate
//! limited.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::device_code::{DeviceAuthorization, ExchangeSuccess};
use super::navigation::Navigator;
use super::retry::PollPolicy;
use super::view::LoginPage;
use crate::api::DeviceAuthApi;
use crate::error::{ClassifiedError, DeviceAuthError};

/// Progress of the exchange loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingState {
    /// Exchange attempts issued so far.
    pub attempt: u32,
    /// Wait before the next attempt.
    pub next_delay: Duration,
    /// Latest retryable failure, kept for display while polling continues.
    pub last_error: Option<ClassifiedError>,
}

/// Why a login stopped without succeeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFailure {
    /// The device code could not be obtained. Not retried.
    DeviceCode(ClassifiedError),
    /// An exchange failed with a terminal or unclassifiable error.
    Exchange {
        device: DeviceAuthorization,
        error: ClassifiedError,
    },
}

impl LoginFailure {
    pub fn error(&self) -> &ClassifiedError {
        match self {
            Self::DeviceCode(error) | Self::Exchange { error, .. } => error,
        }
    }
}

/// Status of one login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStatus {
    Idle,
    /// No `state` was supplied; nothing was requested.
    MissingState,
    RequestingDeviceCode,
    Polling {
        device: DeviceAuthorization,
        polling: PollingState,
    },
    Succeeded {
        device: DeviceAuthorization,
        redirect_url: String,
    },
    Failed(LoginFailure),
    /// Torn down before reaching another terminal state.
    Canceled,
}

impl LoginStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::MissingState | Self::Succeeded { .. } | Self::Failed(_) | Self::Canceled
        )
    }

    /// Device authorization, once known.
    pub fn device(&self) -> Option<&DeviceAuthorization> {
        match self {
            Self::Polling { device, .. }
            | Self::Succeeded { device, .. }
            | Self::Failed(LoginFailure::Exchange { device, .. }) => Some(device),
            _ => None,
        }
    }

    /// Collapse a terminal status into the redirect URL or an error.
    pub fn into_result(self) -> Result<String, DeviceAuthError> {
        match self {
            Self::Succeeded { redirect_url, .. } => Ok(redirect_url),
            Self::MissingState => Err(DeviceAuthError::MissingState),
            Self::Failed(failure) => Err(DeviceAuthError::Request(failure.error().clone())),
            Self::Idle | Self::RequestingDeviceCode | Self::Polling { .. } | Self::Canceled => {
                Err(DeviceAuthError::Canceled)
            }
        }
    }
}

/// Ambient events delivered to a running login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginEvent {
    /// The window or tab regained focus.
    WindowFocus,
}

/// Drives the device-authorization handshake.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use device_auth::api::HttpApiClient;
/// use device_auth::auth::{DeviceAuthController, RecordingNavigator};
/// use device_auth::config::ClientConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = Arc::new(HttpApiClient::new(ClientConfig::from_env()?)?);
/// let controller = DeviceAuthController::new(api, Arc::new(RecordingNavigator::new()));
/// let mut login = controller.start(Some("state-token".to_string()));
/// let redirect_url = login.wait().await.into_result()?;
/// println!("{redirect_url}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DeviceAuthController {
    api: Arc<dyn DeviceAuthApi>,
    navigator: Arc<dyn Navigator>,
    policy: PollPolicy,
}

impl DeviceAuthController {
    pub fn new(api: Arc<dyn DeviceAuthApi>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            navigator,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Request a device code. Failures are returned as-is, never retried.
    pub async fn request_device_code(&self) -> Result<DeviceAuthorization, ClassifiedError> {
        let device = self.api.request_device_code().await?;
        tracing::debug!(
            user_code = %device.user_code,
            interval = ?device.interval,
            expires_in = device.expires_in,
            "device code issued"
        );
        Ok(device)
    }

    /// Exchange `device` until success, a non-retryable error, or `cancel`.
    ///
    /// Fails with [`DeviceAuthError::MissingState`] before any request when
    /// `state` is absent or empty.
    pub async fn poll_exchange(
        &self,
        device: &DeviceAuthorization,
        state: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ExchangeSuccess, DeviceAuthError> {
        self.poll(device, state, cancel, &mut None, |_| {}).await
    }

    /// Run a login in the background and return a handle to observe it.
    ///
    /// Dropping the handle cancels the login.
    pub fn start(&self, state: Option<String>) -> LoginHandle {
        let login_id = Uuid::new_v4();
        let (status_tx, status_rx) = watch::channel(LoginStatus::Idle);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let controller = self.clone();
        let task_cancel = cancel.clone();
        let span = tracing::info_span!("device_login", %login_id);
        tokio::spawn(
            async move {
                controller
                    .run(state, status_tx, events_rx, task_cancel)
                    .await;
            }
            .instrument(span),
        );

        LoginHandle {
            login_id,
            status: status_rx,
            events: events_tx,
            cancel,
        }
    }

    async fn run(
        &self,
        state: Option<String>,
        status: watch::Sender<LoginStatus>,
        events: mpsc::UnboundedReceiver<LoginEvent>,
        cancel: CancellationToken,
    ) {
        let Some(state) = state.filter(|state| !state.is_empty()) else {
            tracing::debug!("no OAuth2 state supplied; not requesting a device code");
            status.send_replace(LoginStatus::MissingState);
            return;
        };

        status.send_replace(LoginStatus::RequestingDeviceCode);
        let requested = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                status.send_replace(LoginStatus::Canceled);
                return;
            }
            requested = self.request_device_code() => requested,
        };
        let device = match requested {
            Ok(device) => device,
            Err(error) => {
                tracing::warn!(error = %error, "device code request failed");
                status.send_replace(LoginStatus::Failed(LoginFailure::DeviceCode(error)));
                return;
            }
        };

        status.send_replace(LoginStatus::Polling {
            device: device.clone(),
            polling: PollingState {
                attempt: 0,
                next_delay: self.policy.delay_for(&device),
                last_error: None,
            },
        });

        let mut events = Some(events);
        let outcome = self
            .poll(&device, Some(state.as_str()), &cancel, &mut events, |polling| {
                status.send_replace(LoginStatus::Polling {
                    device: device.clone(),
                    polling: polling.clone(),
                });
            })
            .await;

        let next = match outcome {
            Ok(_) if cancel.is_cancelled() => LoginStatus::Canceled,
            Ok(success) => {
                tracing::info!("device code exchanged");
                self.navigator.navigate(&success.redirect_url);
                LoginStatus::Succeeded {
                    device,
                    redirect_url: success.redirect_url,
                }
            }
            Err(DeviceAuthError::Request(error)) => {
                LoginStatus::Failed(LoginFailure::Exchange { device, error })
            }
            Err(_) => LoginStatus::Canceled,
        };
        status.send_replace(next);
    }

    async fn poll<F>(
        &self,
        device: &DeviceAuthorization,
        state: Option<&str>,
        cancel: &CancellationToken,
        events: &mut Option<mpsc::UnboundedReceiver<LoginEvent>>,
        mut on_retry: F,
    ) -> Result<ExchangeSuccess, DeviceAuthError>
    where
        F: FnMut(&PollingState),
    {
        let state = state
            .filter(|state| !state.is_empty())
            .ok_or(DeviceAuthError::MissingState)?;
        let delay = self.policy.delay_for(device);
        let mut polling = PollingState {
            attempt: 0,
            next_delay: delay,
            last_error: None,
        };

        loop {
            polling.attempt += 1;
            tracing::debug!(attempt = polling.attempt, "exchanging device code");

            let exchange = self.api.exchange_device_code(&device.device_code, state);
            tokio::pin!(exchange);
            let result = loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(DeviceAuthError::Canceled),
                    result = &mut exchange => break result,
                    event = next_event(events) => ignore_event(event),
                }
            };

            let error = match result {
                Ok(success) => return Ok(success),
                Err(error) => error,
            };
            if !self.policy.should_retry(&error) {
                tracing::warn!(
                    attempt = polling.attempt,
                    kind = ?error.kind(),
                    error = %error,
                    "device code exchange failed"
                );
                return Err(DeviceAuthError::Request(error));
            }

            tracing::warn!(
                attempt = polling.attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "device code exchange not ready; retrying"
            );
            polling.last_error = Some(error);
            on_retry(&polling);

            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(DeviceAuthError::Canceled),
                    _ = &mut sleep => break,
                    event = next_event(events) => ignore_event(event),
                }
            }
        }
    }
}

/// Next ambient event, or never once the sender side is gone.
async fn next_event(events: &mut Option<mpsc::UnboundedReceiver<LoginEvent>>) -> LoginEvent {
    while let Some(rx) = events.as_mut() {
        if let Some(event) = rx.recv().await {
            return event;
        }
        *events = None;
    }
    std::future::pending().await
}

fn ignore_event(event: LoginEvent) {
    tracing::debug!(?event, "exchange runs on the retry timer only; ignoring event");
}

/// Handle for a running login.
#[derive(Debug)]
pub struct LoginHandle {
    login_id: Uuid,
    status: watch::Receiver<LoginStatus>,
    events: mpsc::UnboundedSender<LoginEvent>,
    cancel: CancellationToken,
}

impl LoginHandle {
    pub fn login_id(&self) -> Uuid {
        self.login_id
    }

    /// Latest status.
    pub fn status(&self) -> LoginStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<LoginStatus> {
        self.status.clone()
    }

    /// Presentation model for the latest status.
    pub fn page(&self) -> LoginPage {
        LoginPage::from_status(&self.status.borrow())
    }

    /// Report that the window regained focus. Never triggers an exchange.
    pub fn notify_window_focus(&self) -> bool {
        self.events.send(LoginEvent::WindowFocus).is_ok()
    }

    /// Abandon the login. No request or navigation happens afterwards.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for a terminal status.
    pub async fn wait(&mut self) -> LoginStatus {
        let finished = self
            .status
            .wait_for(LoginStatus::is_terminal)
            .await
            .map(|status| (*status).clone());
        match finished {
            Ok(status) => status,
            Err(_) => {
                let last = self.status.borrow().clone();
                if last.is_terminal() {
                    last
                } else {
                    LoginStatus::Canceled
                }
            }
        }
    }
}

impl Drop for LoginHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
