//! Permission checks shaped for the backend's authorization endpoint.
//!
//! The decision itself is made by the backend; these modules only build the
//! check requests and turn the boolean answers into UI flags.

pub mod organizations;

pub use organizations::{
    can_edit_organization, can_view_organization, fetch_organization_permissions,
    organization_permission_checks,
    OrganizationPermissionName, OrganizationPermissions,
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Resource kinds the backend authorizes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceType {
    Organization,
    OrganizationMember,
    Group,
    AssignOrgRole,
    ProvisionerDaemon,
    ProvisionerJobs,
    #[serde(rename = "idpsync_settings")]
    #[strum(serialize = "idpsync_settings")]
    IdpSyncSettings,
}

/// Action requested on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Assign,
}

/// Object a check is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationObject {
    pub resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

/// One named question sent to the authorization endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCheck {
    pub object: AuthorizationObject,
    pub action: Action,
}

impl AuthorizationCheck {
    pub fn in_organization(
        resource_type: ResourceType,
        organization_id: impl Into<String>,
        action: Action,
    ) -> Self {
        Self {
            object: AuthorizationObject {
                resource_type,
                organization_id: Some(organization_id.into()),
            },
            action,
        }
    }
}
