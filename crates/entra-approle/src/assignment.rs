//! App role assignment write.

use tracing::{info, instrument};

use crate::{
    AccessToken, AppRoleAssignment, AppRoleAssignmentRequest, AppRoleError, AppRoleResult,
    GraphClient,
};

/// Creates an app role assignment on the application's service principal.
///
/// An existing identical assignment is reported by Graph as a 4xx and comes
/// back as `AppRoleError::Assignment` like any other failure.
///
/// # Errors
///
/// Returns `AppRoleError::Assignment` carrying the upstream message.
#[instrument(skip(graph, token))]
pub async fn assign_role(
    graph: &GraphClient,
    token: &AccessToken,
    service_principal_id: &str,
    app_role_id: &str,
    principal_id: &str,
) -> AppRoleResult<AppRoleAssignment> {
    let url = format!(
        "{}/servicePrincipals/{}/appRoleAssignments",
        graph.base_url(),
        service_principal_id
    );
    let request = AppRoleAssignmentRequest {
        principal_id: principal_id.to_string(),
        resource_id: service_principal_id.to_string(),
        app_role_id: app_role_id.to_string(),
    };

    let created: AppRoleAssignment = graph
        .post(token, &url, &request)
        .await
        .map_err(AppRoleError::Assignment)?;

    info!(
        assignment_id = created.id.as_deref().unwrap_or_default(),
        "App role assignment created"
    );

    Ok(created)
}
