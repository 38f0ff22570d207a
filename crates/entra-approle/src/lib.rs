//! Entra ID app role assignment via Microsoft Graph.
//!
//! Resolves an application, a user or group, and an app role by name, then
//! creates one app role assignment. Intended to run as a single CI step.
//!
//! # Example
//!
//! ```no_run
//! use entra_approle::{AppRoleAssigner, AssignmentInputs};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let assigner = AppRoleAssigner::from_inputs(AssignmentInputs::from_env())?;
//! let outcome = assigner.run().await?;
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```

mod assignment;
mod auth;
mod config;
mod error;
mod graph_client;
mod models;
mod orchestrator;
mod resolvers;

// Re-exports
pub use assignment::assign_role;
pub use auth::{AccessToken, CredentialResolver};
pub use config::{
    AssignmentConfig, AssignmentInputs, EntraCloudEnvironment, EntraCredentials, PrincipalKind,
    DEFAULT_GRAPH_API_VERSION, DEFAULT_ROLE_NAME, GROUP_DISCRIMINATOR, INPUT_APPLICATION_NAME,
    INPUT_AUTHORITY_HOST, INPUT_CLIENT_ID, INPUT_CLIENT_SECRET, INPUT_CLOUD,
    INPUT_GRAPH_API_VERSION, INPUT_GRAPH_ENDPOINT, INPUT_RESOURCE_NAME, INPUT_RESOURCE_TYPE,
    INPUT_ROLE_NAME, INPUT_TENANT_ID,
};
pub use error::{AppRoleError, AppRoleResult, EntityKind, GraphFailure};
pub use graph_client::{GraphClient, ODataError, ODataErrorBody, ODataResponse};
pub use models::{
    select_app_role, AppRole, AppRoleAssignment, AppRoleAssignmentRequest, DirectoryObject,
    Principal, ServicePrincipal,
};
pub use orchestrator::{AppRoleAssigner, AssignmentFailure, AssignmentOutcome, ResolvedIds, Stage};
pub use resolvers::{
    application_filter, group_filter, resolve_application, resolve_group, resolve_user,
    user_filter,
};
