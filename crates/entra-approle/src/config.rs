//! Run configuration for an app role assignment.
//!
//! Inputs use the GitHub Actions naming convention (`INPUT_<NAME>`) and are
//! read once at startup through a reader closure, so tests can supply values
//! without touching the process environment.

use std::env::VarError;
use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;

use crate::{AppRoleError, AppRoleResult};

pub const INPUT_CLIENT_ID: &str = "INPUT_CLIENT_ID";
pub const INPUT_CLIENT_SECRET: &str = "INPUT_CLIENT_SECRET";
pub const INPUT_TENANT_ID: &str = "INPUT_TENANT_ID";
pub const INPUT_APPLICATION_NAME: &str = "INPUT_APPLICATION_NAME";
pub const INPUT_RESOURCE_TYPE: &str = "INPUT_RESOURCE_TYPE";
pub const INPUT_RESOURCE_NAME: &str = "INPUT_RESOURCE_NAME";
pub const INPUT_ROLE_NAME: &str = "INPUT_ROLE_NAME";
pub const INPUT_CLOUD: &str = "INPUT_CLOUD";
pub const INPUT_AUTHORITY_HOST: &str = "INPUT_AUTHORITY_HOST";
pub const INPUT_GRAPH_ENDPOINT: &str = "INPUT_GRAPH_ENDPOINT";
pub const INPUT_GRAPH_API_VERSION: &str = "INPUT_GRAPH_API_VERSION";

/// Role assigned when no role name is configured.
pub const DEFAULT_ROLE_NAME: &str = "User";

/// Graph API version used unless overridden.
pub const DEFAULT_GRAPH_API_VERSION: &str = "v1.0";

/// Resource type value that selects the group path. Matched case-sensitively.
pub const GROUP_DISCRIMINATOR: &str = "Group";

/// Microsoft national cloud the tenant lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntraCloudEnvironment {
    #[default]
    Commercial,
    UsGovernment,
    China,
    Germany,
}

impl EntraCloudEnvironment {
    /// Base URL of the Azure AD authority.
    #[must_use]
    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Commercial => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
            Self::Germany => "https://login.microsoftonline.de",
        }
    }

    /// Base URL of Microsoft Graph, without API version.
    #[must_use]
    pub fn graph_endpoint(&self) -> &'static str {
        match self {
            Self::Commercial => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
            Self::Germany => "https://graph.microsoft.de",
        }
    }
}

impl FromStr for EntraCloudEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "commercial" | "public" | "azurecloud" => Ok(Self::Commercial),
            "usgovernment" | "government" | "azureusgovernment" => Ok(Self::UsGovernment),
            "china" | "azurechinacloud" => Ok(Self::China),
            "germany" | "azuregermancloud" => Ok(Self::Germany),
            other => Err(format!("unknown cloud environment '{other}'")),
        }
    }
}

/// Client credentials for the app registration that performs the assignment.
#[derive(Debug)]
pub struct EntraCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Which kind of principal receives the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    Group,
}

impl PrincipalKind {
    /// Maps the configured resource type onto a principal kind.
    ///
    /// Only the exact value `"Group"` selects groups; anything else, including
    /// `"group"`, resolves a user.
    #[must_use]
    pub fn from_discriminator(resource_type: &str) -> Self {
        if resource_type == GROUP_DISCRIMINATOR {
            Self::Group
        } else {
            Self::User
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("User"),
            Self::Group => f.write_str("Group"),
        }
    }
}

/// Raw inputs as supplied by the hosting automation system.
///
/// Unset, empty and whitespace-only inputs are all `None`.
#[derive(Debug, Default)]
pub struct AssignmentInputs {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub tenant_id: Option<String>,
    pub application_name: Option<String>,
    pub resource_type: Option<String>,
    pub resource_name: Option<String>,
    pub role_name: Option<String>,
    pub cloud: Option<String>,
    pub authority_host: Option<String>,
    pub graph_endpoint: Option<String>,
    pub graph_api_version: Option<String>,
}

impl AssignmentInputs {
    /// Reads inputs from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Reads inputs through a custom variable reader.
    pub fn from_reader<F>(reader: F) -> Self
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let read = |key: &str| {
            reader(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            client_id: read(INPUT_CLIENT_ID),
            client_secret: read(INPUT_CLIENT_SECRET).map(SecretString::from),
            tenant_id: read(INPUT_TENANT_ID),
            application_name: read(INPUT_APPLICATION_NAME),
            resource_type: read(INPUT_RESOURCE_TYPE),
            resource_name: read(INPUT_RESOURCE_NAME),
            role_name: read(INPUT_ROLE_NAME),
            cloud: read(INPUT_CLOUD),
            authority_host: read(INPUT_AUTHORITY_HOST),
            graph_endpoint: read(INPUT_GRAPH_ENDPOINT),
            graph_api_version: read(INPUT_GRAPH_API_VERSION),
        }
    }

    /// Checks that every required input is present and builds the run configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppRoleError::Config` naming every missing input, or an
    /// unrecognised cloud environment.
    pub fn validate(self) -> AppRoleResult<AssignmentConfig> {
        let mut missing = Vec::new();

        let client_id = require(self.client_id, INPUT_CLIENT_ID, &mut missing);
        if self.client_secret.is_none() {
            missing.push(INPUT_CLIENT_SECRET);
        }
        let tenant_id = require(self.tenant_id, INPUT_TENANT_ID, &mut missing);
        let application_name = require(self.application_name, INPUT_APPLICATION_NAME, &mut missing);
        let resource_type = require(self.resource_type, INPUT_RESOURCE_TYPE, &mut missing);
        let resource_name = require(self.resource_name, INPUT_RESOURCE_NAME, &mut missing);

        let client_secret = match self.client_secret {
            Some(secret) if missing.is_empty() => secret,
            _ => {
                return Err(AppRoleError::Config(format!(
                    "missing required input(s): {}",
                    missing.join(", ")
                )))
            }
        };

        let cloud = self
            .cloud
            .as_deref()
            .map(str::parse::<EntraCloudEnvironment>)
            .transpose()
            .map_err(AppRoleError::Config)?
            .unwrap_or_default();

        Ok(AssignmentConfig {
            credentials: EntraCredentials {
                client_id,
                client_secret,
            },
            tenant_id,
            application_name,
            principal_kind: PrincipalKind::from_discriminator(&resource_type),
            resource_name,
            role_name: self.role_name,
            cloud,
            authority_host: self.authority_host.map(trim_trailing_slash),
            graph_endpoint: self.graph_endpoint.map(trim_trailing_slash),
            api_version: self
                .graph_api_version
                .unwrap_or_else(|| DEFAULT_GRAPH_API_VERSION.to_string()),
        })
    }
}

fn require(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    value.unwrap_or_else(|| {
        missing.push(name);
        String::new()
    })
}

fn trim_trailing_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Validated configuration for a single assignment run.
#[derive(Debug)]
pub struct AssignmentConfig {
    pub credentials: EntraCredentials,
    pub tenant_id: String,
    /// Display name of the target service principal.
    pub application_name: String,
    pub principal_kind: PrincipalKind,
    /// Group display name or user principal name, depending on `principal_kind`.
    pub resource_name: String,
    /// App role display name; `None` means [`DEFAULT_ROLE_NAME`].
    pub role_name: Option<String>,
    pub cloud: EntraCloudEnvironment,
    pub authority_host: Option<String>,
    pub graph_endpoint: Option<String>,
    pub api_version: String,
}

impl AssignmentConfig {
    /// Authority base URL, honouring an explicit override.
    #[must_use]
    pub fn login_endpoint(&self) -> &str {
        self.authority_host
            .as_deref()
            .unwrap_or_else(|| self.cloud.login_endpoint())
    }

    /// Graph base URL (without version), honouring an explicit override.
    #[must_use]
    pub fn graph_endpoint(&self) -> &str {
        self.graph_endpoint
            .as_deref()
            .unwrap_or_else(|| self.cloud.graph_endpoint())
    }

    /// Role to assign, falling back to [`DEFAULT_ROLE_NAME`].
    #[must_use]
    pub fn role_name_or_default(&self) -> &str {
        self.role_name.as_deref().unwrap_or(DEFAULT_ROLE_NAME)
    }
}
