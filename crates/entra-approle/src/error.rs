//! Error types for app role assignment.

use std::fmt;

use thiserror::Error;

/// Result type alias using `AppRoleError`.
pub type AppRoleResult<T> = Result<T, AppRoleError>;

/// Directory entity looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Application,
    User,
    Group,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Application => "application",
            Self::User => "user",
            Self::Group => "group",
        };
        f.write_str(name)
    }
}

/// Failure reported by Microsoft Graph or by the transport beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphFailure {
    /// HTTP status, `None` when no response was received.
    pub status: Option<u16>,
    /// `OData` error code, or the status line when the body was not an `OData` error.
    pub code: String,
    pub message: String,
}

impl GraphFailure {
    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            code: "transport".to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for GraphFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code, self.message)
    }
}

/// Errors that can terminate an assignment run.
#[derive(Debug, Error)]
pub enum AppRoleError {
    /// Required input missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token request failed. `status` is `None` when no response was received.
    #[error("Authentication error: {message}")]
    Auth {
        status: Option<u16>,
        message: String,
    },

    /// A Graph lookup failed or returned malformed data.
    #[error("Graph request failed: {0}")]
    GraphRequest(GraphFailure),

    /// A named entity had no match in the directory.
    #[error("No {entity} found with name '{name}'")]
    NotFound { entity: EntityKind, name: String },

    /// One or more identifiers were still unresolved before the write.
    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The app role assignment write failed.
    #[error("Role assignment failed: {0}")]
    Assignment(GraphFailure),
}

impl AppRoleError {
    /// HTTP status of the upstream response behind this error, if any.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::GraphRequest(failure) | Self::Assignment(failure) => failure.status,
            Self::Auth { status, .. } => *status,
            _ => None,
        }
    }
}
