//! Name to object id resolution via filtered Graph list queries.
//!
//! Names are interpolated into the `$filter` expression as-is. A single quote
//! in a name is not doubled, so the resulting filter is malformed and Graph
//! rejects the query with a 400, which surfaces as a `GraphRequest` error.

use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use crate::{
    AccessToken, AppRoleError, AppRoleResult, DirectoryObject, EntityKind, GraphClient,
    ODataResponse, ServicePrincipal,
};

/// `$filter` expression matching a service principal by display name.
#[must_use]
pub fn application_filter(name: &str) -> String {
    format!("displayName eq '{name}'")
}

/// `$filter` expression matching a user by principal name.
#[must_use]
pub fn user_filter(name: &str) -> String {
    format!("userPrincipalName eq '{name}'")
}

/// `$filter` expression matching a group by display name.
#[must_use]
pub fn group_filter(name: &str) -> String {
    format!("displayName eq '{name}'")
}

/// Resolves the application's service principal by display name.
///
/// # Errors
///
/// `GraphRequest` when the lookup fails, `NotFound` when nothing matches.
#[instrument(skip(graph, token))]
pub async fn resolve_application(
    graph: &GraphClient,
    token: &AccessToken,
    name: &str,
) -> AppRoleResult<ODataResponse<ServicePrincipal>> {
    lookup(
        graph,
        token,
        "servicePrincipals",
        &application_filter(name),
        EntityKind::Application,
        name,
    )
    .await
}

/// Resolves a user by user principal name.
///
/// # Errors
///
/// `GraphRequest` when the lookup fails, `NotFound` when nothing matches.
#[instrument(skip(graph, token))]
pub async fn resolve_user(
    graph: &GraphClient,
    token: &AccessToken,
    name: &str,
) -> AppRoleResult<ODataResponse<DirectoryObject>> {
    lookup(graph, token, "users", &user_filter(name), EntityKind::User, name).await
}

/// Resolves a group by display name.
///
/// # Errors
///
/// `GraphRequest` when the lookup fails, `NotFound` when nothing matches.
#[instrument(skip(graph, token))]
pub async fn resolve_group(
    graph: &GraphClient,
    token: &AccessToken,
    name: &str,
) -> AppRoleResult<ODataResponse<DirectoryObject>> {
    lookup(graph, token, "groups", &group_filter(name), EntityKind::Group, name).await
}

/// Runs one filtered list query and rejects an empty result.
async fn lookup<T: DeserializeOwned>(
    graph: &GraphClient,
    token: &AccessToken,
    collection: &str,
    filter: &str,
    entity: EntityKind,
    name: &str,
) -> AppRoleResult<ODataResponse<T>> {
    let url = format!(
        "{}/{}?$filter={}",
        graph.base_url(),
        collection,
        urlencoding::encode(filter)
    );

    let response: ODataResponse<T> = graph.get(token, &url).await?;

    match response.value.len() {
        0 => {
            return Err(AppRoleError::NotFound {
                entity,
                name: name.to_string(),
            })
        }
        1 => info!("Resolved {entity} '{name}'"),
        n => warn!("{n} {entity} entries match '{name}', using the first"),
    }
    if response.next_link.is_some() {
        warn!("Lookup for {entity} '{name}' returned more than one page; only the first is used");
    }

    Ok(response)
}
