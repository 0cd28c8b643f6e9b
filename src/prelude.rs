//! Convenience re-exports for common use.

pub use crate::api::{AuthorizationApi, DeviceAuthApi, HttpApiClient};
pub use crate::auth::{
    DeviceAuthController, DeviceAuthorization, LoginHandle, LoginPage, LoginStatus, Navigator,
};
pub use crate::config::ClientConfig;
pub use crate::error::{ClassifiedError, DeviceAuthError, Result};
pub use crate::permissions::{can_edit_organization, can_view_organization, OrganizationPermissions};
