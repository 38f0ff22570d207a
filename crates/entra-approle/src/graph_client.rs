//! Authenticated Microsoft Graph HTTP client.
//!
//! Only the first page of a list response is ever read; `@odata.nextLink` is
//! surfaced on [`ODataResponse`] but not followed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{AccessToken, AppRoleError, AppRoleResult, GraphFailure};

/// `OData` error response from Microsoft Graph.
#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

/// `OData` error body.
#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
}

/// List response from a Graph collection endpoint.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Microsoft Graph API client. Holds no token; callers pass one per request.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http_client: reqwest::Client,
    graph_endpoint: String,
    api_version: String,
}

impl GraphClient {
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        graph_endpoint: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            graph_endpoint: graph_endpoint.into(),
            api_version: api_version.into(),
        }
    }

    /// Returns the base URL for Graph API requests.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}/{}", self.graph_endpoint, self.api_version)
    }

    /// Performs an authenticated GET and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns `AppRoleError::GraphRequest` for transport failures, non-2xx
    /// responses and bodies that do not decode into `T`.
    #[instrument(skip(self, token))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        url: &str,
    ) -> AppRoleResult<T> {
        let request = self.http_client.get(url).bearer_auth(token.bearer());
        Self::send(request).await.map_err(AppRoleError::GraphRequest)
    }

    /// Performs an authenticated POST with a JSON body.
    ///
    /// The raw [`GraphFailure`] is returned so the caller can classify it.
    #[instrument(skip(self, token, body))]
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        token: &AccessToken,
        url: &str,
        body: &B,
    ) -> Result<T, GraphFailure> {
        let request = self
            .http_client
            .post(url)
            .bearer_auth(token.bearer())
            .json(body);
        Self::send(request).await
    }

    async fn send<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, GraphFailure> {
        let response = request
            .send()
            .await
            .map_err(|e| GraphFailure::transport(&e))?;
        let status = response.status();
        debug!(%status, "Graph responded");

        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| GraphFailure::transport(&e))?;
            return serde_json::from_slice(&body).map_err(|e| GraphFailure {
                status: Some(status.as_u16()),
                code: "MalformedResponse".to_string(),
                message: format!("Failed to decode Graph response: {e}"),
            });
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(parse_error_body(status, &error_body))
    }
}

/// Uses the `OData` error envelope when present, else the raw body.
fn parse_error_body(status: reqwest::StatusCode, body: &str) -> GraphFailure {
    match serde_json::from_str::<ODataError>(body) {
        Ok(odata_error) => GraphFailure {
            status: Some(status.as_u16()),
            code: odata_error.error.code,
            message: odata_error.error.message,
        },
        Err(_) => GraphFailure {
            status: Some(status.as_u16()),
            code: status.to_string(),
            message: body.to_string(),
        },
    }
}
