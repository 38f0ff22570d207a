//! Common test utilities for entra-approle integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::env::VarError;

use entra_approle::{
    AppRoleAssigner, AssignmentInputs, INPUT_APPLICATION_NAME, INPUT_AUTHORITY_HOST,
    INPUT_CLIENT_ID, INPUT_CLIENT_SECRET, INPUT_GRAPH_ENDPOINT, INPUT_RESOURCE_NAME,
    INPUT_RESOURCE_TYPE, INPUT_ROLE_NAME, INPUT_TENANT_ID,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT_ID: &str = "test-tenant";
pub const ACCESS_TOKEN: &str = "mock-access-token";
/// Loopback port 1 has no listener, so connections are refused.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

/// Test data factory for an app role.
pub fn create_app_role(id: &str, display_name: &str) -> Value {
    json!({
        "id": id,
        "displayName": display_name,
        "value": display_name,
        "description": format!("{} role", display_name),
        "isEnabled": true,
        "allowedMemberTypes": ["User"]
    })
}

/// Test data factory for a service principal.
pub fn create_service_principal(id: &str, display_name: &str, app_roles: Vec<Value>) -> Value {
    json!({
        "id": id,
        "appId": format!("app-{}", id),
        "displayName": display_name,
        "servicePrincipalType": "Application",
        "appRoles": app_roles
    })
}

/// Test data factory for an Entra group.
pub fn create_test_group(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "displayName": name,
        "securityEnabled": true,
        "mailEnabled": false,
        "groupTypes": []
    })
}

/// Test data factory for an Entra user.
pub fn create_test_user(id: &str, upn: &str) -> Value {
    json!({
        "id": id,
        "userPrincipalName": upn,
        "displayName": "Test User",
        "accountEnabled": true
    })
}

/// Wraps items in an `OData` list response.
pub fn create_odata_response(items: Vec<Value>) -> Value {
    json!({ "value": items })
}

/// Creates an `OData` error response.
pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3599,
        "ext_expires_in": 3599
    })
}

/// Created assignment as echoed back by Graph.
pub fn create_assignment_response(
    principal_id: &str,
    resource_id: &str,
    app_role_id: &str,
) -> Value {
    json!({
        "id": "assignment-1",
        "principalId": principal_id,
        "principalType": "Group",
        "principalDisplayName": "Finance",
        "resourceId": resource_id,
        "resourceDisplayName": "Payroll",
        "appRoleId": app_role_id,
        "createdDateTime": "2024-01-15T10:00:00Z"
    })
}

/// Mock server standing in for both the token endpoint and Graph.
pub struct MockGraphServer {
    pub server: MockServer,
}

impl MockGraphServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Token endpoint that issues [`ACCESS_TOKEN`].
    pub async fn mock_token_endpoint(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/oauth2/v2.0/token", TENANT_ID)))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=client-id"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_token_response(ACCESS_TOKEN)),
            )
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Token endpoint that rejects the credentials.
    pub async fn mock_token_rejected(&self, status: u16, description: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/oauth2/v2.0/token", TENANT_ID)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "error": "invalid_client",
                "error_description": description,
                "error_codes": [7000215]
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Service principal lookup filtered by display name.
    pub async fn mock_service_principals(
        &self,
        name: &str,
        items: Vec<Value>,
        expected_calls: u64,
    ) {
        self.mock_lookup(
            "/v1.0/servicePrincipals",
            format!("displayName eq '{}'", name),
            ResponseTemplate::new(200).set_body_json(create_odata_response(items)),
            expected_calls,
        )
        .await;
    }

    /// Group lookup filtered by display name.
    pub async fn mock_groups(&self, name: &str, items: Vec<Value>, expected_calls: u64) {
        self.mock_lookup(
            "/v1.0/groups",
            format!("displayName eq '{}'", name),
            ResponseTemplate::new(200).set_body_json(create_odata_response(items)),
            expected_calls,
        )
        .await;
    }

    /// User lookup filtered by user principal name.
    pub async fn mock_users(&self, upn: &str, items: Vec<Value>, expected_calls: u64) {
        self.mock_lookup(
            "/v1.0/users",
            format!("userPrincipalName eq '{}'", upn),
            ResponseTemplate::new(200).set_body_json(create_odata_response(items)),
            expected_calls,
        )
        .await;
    }

    /// Any call to `collection_path` fails the test.
    pub async fn forbid(&self, http_method: &str, collection_path: &str) {
        Mock::given(method(http_method))
            .and(path(collection_path))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Lookup answered with an `OData` error.
    pub async fn mock_lookup_error(
        &self,
        collection_path: &str,
        filter: String,
        status: u16,
        code: &str,
        message: &str,
    ) {
        self.mock_lookup(
            collection_path,
            filter,
            ResponseTemplate::new(status).set_body_json(create_odata_error(code, message)),
            1,
        )
        .await;
    }

    async fn mock_lookup(
        &self,
        collection_path: &str,
        filter: String,
        response: ResponseTemplate,
        expected_calls: u64,
    ) {
        Mock::given(method("GET"))
            .and(path(collection_path))
            .and(query_param("$filter", filter))
            .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN)))
            .respond_with(response)
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// Assignment write expecting an exact JSON body.
    pub async fn mock_assignment(
        &self,
        service_principal_id: &str,
        expected_body: Value,
        response: ResponseTemplate,
    ) {
        Mock::given(method("POST"))
            .and(path(format!(
                "/v1.0/servicePrincipals/{}/appRoleAssignments",
                service_principal_id
            )))
            .and(header("authorization", format!("Bearer {}", ACCESS_TOKEN)))
            .and(body_json(expected_body))
            .respond_with(response)
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Assigner whose token and Graph hosts both point at this server.
    pub fn assigner(
        &self,
        application: &str,
        resource_type: &str,
        resource: &str,
        role: Option<&str>,
    ) -> AppRoleAssigner {
        self.assigner_with_authority(self.url(), application, resource_type, resource, role)
    }

    /// Assigner that requests its token from `authority` and talks Graph on this server.
    pub fn assigner_with_authority(
        &self,
        authority: String,
        application: &str,
        resource_type: &str,
        resource: &str,
        role: Option<&str>,
    ) -> AppRoleAssigner {
        let mut vars: HashMap<&str, String> = HashMap::from([
            (INPUT_CLIENT_ID, "client-id".to_string()),
            (INPUT_CLIENT_SECRET, "client-secret".to_string()),
            (INPUT_TENANT_ID, TENANT_ID.to_string()),
            (INPUT_APPLICATION_NAME, application.to_string()),
            (INPUT_RESOURCE_TYPE, resource_type.to_string()),
            (INPUT_RESOURCE_NAME, resource.to_string()),
            (INPUT_AUTHORITY_HOST, authority),
            (INPUT_GRAPH_ENDPOINT, self.url()),
        ]);
        if let Some(role) = role {
            vars.insert(INPUT_ROLE_NAME, role.to_string());
        }

        let inputs = AssignmentInputs::from_reader(move |key: &str| {
            vars.get(key).cloned().ok_or(VarError::NotPresent)
        });
        AppRoleAssigner::from_inputs(inputs).expect("test inputs should validate")
    }
}
