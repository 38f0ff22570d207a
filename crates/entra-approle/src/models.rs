//! Graph resources read and written during an assignment run.

use serde::{Deserialize, Serialize};

use crate::PrincipalKind;

/// Service principal of the application that declares the app roles.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipal {
    pub id: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub app_roles: Vec<AppRole>,
}

/// Role declared on an application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRole {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub is_enabled: Option<bool>,
}

impl AppRole {
    /// True only when Graph explicitly reports the role as disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.is_enabled == Some(false)
    }
}

/// User or group as returned by a filtered list query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryObject {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
}

/// The user or group receiving the role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User { id: Option<String> },
    Group { id: Option<String> },
}

impl Principal {
    pub(crate) fn from_object(kind: PrincipalKind, object: &DirectoryObject) -> Self {
        let id = object.id.clone();
        match kind {
            PrincipalKind::User => Self::User { id },
            PrincipalKind::Group => Self::Group { id },
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::User { id } | Self::Group { id } => id.as_deref(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Self::User { .. } => PrincipalKind::User,
            Self::Group { .. } => PrincipalKind::Group,
        }
    }
}

/// Body of `POST /servicePrincipals/{id}/appRoleAssignments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRoleAssignmentRequest {
    pub principal_id: String,
    /// Service principal id of the application.
    pub resource_id: String,
    pub app_role_id: String,
}

/// Assignment created by Graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRoleAssignment {
    pub id: Option<String>,
    pub principal_id: Option<String>,
    pub principal_display_name: Option<String>,
    pub principal_type: Option<String>,
    pub resource_id: Option<String>,
    pub resource_display_name: Option<String>,
    pub app_role_id: Option<String>,
    pub created_date_time: Option<String>,
}

/// Picks the first app role whose display name equals `role_name`.
#[must_use]
pub fn select_app_role<'a>(app_roles: &'a [AppRole], role_name: &str) -> Option<&'a AppRole> {
    app_roles
        .iter()
        .find(|role| role.display_name.as_deref() == Some(role_name))
}
