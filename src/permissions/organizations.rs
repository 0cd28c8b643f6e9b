//! Organization-scoped permission checks and the flags derived from them.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use super::{Action, AuthorizationCheck, ResourceType};
use crate::api::AuthorizationApi;
use crate::error::ClassifiedError;

/// Names of the checks asked for every organization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "camelCase")]
pub enum OrganizationPermissionName {
    ViewMembers,
    EditMembers,
    CreateGroup,
    ViewGroups,
    EditGroups,
    EditSettings,
    AssignOrgRoles,
    ViewOrgRoles,
    CreateOrgRoles,
    UpdateOrgRoles,
    DeleteOrgRoles,
    ViewProvisioners,
    ViewProvisionerJobs,
    ViewIdpSyncSettings,
    EditIdpSyncSettings,
}

impl OrganizationPermissionName {
    /// Resource and action this name asks about.
    pub fn target(self) -> (ResourceType, Action) {
        use OrganizationPermissionName::*;
        match self {
            ViewMembers => (ResourceType::OrganizationMember, Action::Read),
            EditMembers => (ResourceType::OrganizationMember, Action::Update),
            CreateGroup => (ResourceType::Group, Action::Create),
            ViewGroups => (ResourceType::Group, Action::Read),
            EditGroups => (ResourceType::Group, Action::Update),
            EditSettings => (ResourceType::Organization, Action::Update),
            AssignOrgRoles => (ResourceType::AssignOrgRole, Action::Assign),
            ViewOrgRoles => (ResourceType::AssignOrgRole, Action::Read),
            CreateOrgRoles => (ResourceType::AssignOrgRole, Action::Create),
            UpdateOrgRoles => (ResourceType::AssignOrgRole, Action::Update),
            DeleteOrgRoles => (ResourceType::AssignOrgRole, Action::Delete),
            ViewProvisioners => (ResourceType::ProvisionerDaemon, Action::Read),
            ViewProvisionerJobs => (ResourceType::ProvisionerJobs, Action::Read),
            ViewIdpSyncSettings => (ResourceType::IdpSyncSettings, Action::Read),
            EditIdpSyncSettings => (ResourceType::IdpSyncSettings, Action::Update),
        }
    }
}

/// Build the named checks for one organization, keyed by permission name.
pub fn organization_permission_checks(
    organization_id: &str,
) -> BTreeMap<String, AuthorizationCheck> {
    OrganizationPermissionName::iter()
        .map(|name| {
            let (resource_type, action) = name.target();
            (
                name.to_string(),
                AuthorizationCheck::in_organization(resource_type, organization_id, action),
            )
        })
        .collect()
}

/// Answers to [`organization_permission_checks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationPermissions {
    pub view_members: bool,
    pub edit_members: bool,
    pub create_group: bool,
    pub view_groups: bool,
    pub edit_groups: bool,
    pub edit_settings: bool,
    pub assign_org_roles: bool,
    pub view_org_roles: bool,
    pub create_org_roles: bool,
    pub update_org_roles: bool,
    pub delete_org_roles: bool,
    pub view_provisioners: bool,
    pub view_provisioner_jobs: bool,
    pub view_idp_sync_settings: bool,
    pub edit_idp_sync_settings: bool,
}

impl OrganizationPermissions {
    /// Read the flags from the endpoint's answer. Names it left out are `false`.
    pub fn from_results(results: &HashMap<String, bool>) -> Self {
        let has = |name: OrganizationPermissionName| {
            results.get(name.as_ref()).copied().unwrap_or(false)
        };
        use OrganizationPermissionName::*;
        Self {
            view_members: has(ViewMembers),
            edit_members: has(EditMembers),
            create_group: has(CreateGroup),
            view_groups: has(ViewGroups),
            edit_groups: has(EditGroups),
            edit_settings: has(EditSettings),
            assign_org_roles: has(AssignOrgRoles),
            view_org_roles: has(ViewOrgRoles),
            create_org_roles: has(CreateOrgRoles),
            update_org_roles: has(UpdateOrgRoles),
            delete_org_roles: has(DeleteOrgRoles),
            view_provisioners: has(ViewProvisioners),
            view_provisioner_jobs: has(ViewProvisionerJobs),
            view_idp_sync_settings: has(ViewIdpSyncSettings),
            edit_idp_sync_settings: has(EditIdpSyncSettings),
        }
    }
}

/// Ask the backend for every organization permission of the current user.
pub async fn fetch_organization_permissions(
    api: &dyn AuthorizationApi,
    organization_id: &str,
) -> Result<OrganizationPermissions, ClassifiedError> {
    let checks = organization_permission_checks(organization_id);
    let results = api.check_authorization(&checks).await?;
    Ok(OrganizationPermissions::from_results(&results))
}

/// True if the user can view members, groups, provisioners or IdP sync
/// settings of the organization.
pub fn can_view_organization(permissions: Option<&OrganizationPermissions>) -> bool {
    permissions.is_some_and(|p| {
        p.view_members || p.view_groups || p.view_provisioners || p.view_idp_sync_settings
    })
}

/// True if the user can edit the organization settings or its members.
pub fn can_edit_organization(permissions: Option<&OrganizationPermissions>) -> bool {
    permissions.is_some_and(|p| {
        p.edit_members
            || p.edit_groups
            || p.edit_settings
            || p.assign_org_roles
            || p.edit_idp_sync_settings
            || p.create_org_roles
    })
}
