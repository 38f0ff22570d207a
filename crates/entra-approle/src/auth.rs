//! `OAuth2` client credentials exchange against the Azure AD v2.0 endpoint.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{AppRoleError, AppRoleResult, EntraCredentials};

/// `OAuth2` token response from Azure AD.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: Option<String>,
    expires_in: Option<i64>,
}

/// Error body returned by the Azure AD token endpoint.
#[derive(Debug, Deserialize)]
struct AadErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Bearer token scoped to Microsoft Graph, valid for a single run.
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    pub(crate) fn bearer(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Exchanges client id and secret for a Graph access token.
#[derive(Debug)]
pub struct CredentialResolver<'a> {
    http_client: reqwest::Client,
    login_endpoint: &'a str,
    graph_endpoint: &'a str,
    tenant_id: &'a str,
    credentials: &'a EntraCredentials,
}

impl<'a> CredentialResolver<'a> {
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        login_endpoint: &'a str,
        graph_endpoint: &'a str,
        tenant_id: &'a str,
        credentials: &'a EntraCredentials,
    ) -> Self {
        Self {
            http_client,
            login_endpoint,
            graph_endpoint,
            tenant_id,
            credentials,
        }
    }

    /// Tenant-specific token endpoint.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.login_endpoint, self.tenant_id)
    }

    /// Requests a token with the client credentials grant. No caching and no retry.
    ///
    /// # Errors
    ///
    /// Returns `AppRoleError::Auth` on transport failure (no status), a non-2xx
    /// status or an unparseable body.
    #[instrument(
        skip(self),
        fields(tenant_id = %self.tenant_id, client_id = %self.credentials.client_id)
    )]
    pub async fn get_access_token(&self) -> AppRoleResult<AccessToken> {
        let scope = format!("{}/.default", self.graph_endpoint);
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose_secret()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http_client
            .post(self.token_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| AppRoleError::Auth {
                status: e.status().map(|s| s.as_u16()),
                message: format!("Token request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppRoleError::Auth {
                status: Some(status.as_u16()),
                message: describe_token_error(status, &body),
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| AppRoleError::Auth {
            status: Some(status.as_u16()),
            message: format!("Failed to parse token response: {e}"),
        })?;

        debug!(expires_in = ?token.expires_in, "Acquired access token");

        Ok(AccessToken::new(token.access_token))
    }
}

/// Prefers the provider's `error_description`, falling back to the raw body.
fn describe_token_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<AadErrorResponse>(body) {
        Ok(AadErrorResponse {
            error_description: Some(description),
            ..
        }) => format!("Token request failed with status {status}: {description}"),
        Ok(AadErrorResponse {
            error: Some(error), ..
        }) => format!("Token request failed with status {status}: {error}"),
        _ => format!("Token request failed with status {status}: {body}"),
    }
}
