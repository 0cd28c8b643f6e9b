//! OAuth2 device-authorization login.

pub mod controller;
pub mod device_code;
pub mod navigation;
pub mod retry;
pub mod view;

pub use controller::{
    DeviceAuthController, LoginEvent, LoginFailure, LoginHandle, LoginStatus, PollingState,
};
pub use device_code::{DeviceAuthorization, ExchangeSuccess};
pub use navigation::{Navigator, RecordingNavigator};
pub use retry::{PollPolicy, DEFAULT_POLL_INTERVAL};
pub use view::{LoginPage, LoginView};
