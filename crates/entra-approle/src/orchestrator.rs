//! Sequences token acquisition, lookups and the assignment write.
//!
//! A run walks `Start -> TokenAcquired -> ApplicationResolved ->
//! PrincipalResolved -> RoleSelected -> Assigned -> Done`. The first error
//! ends the run; nothing is retried and the write is never attempted with an
//! incomplete id set.

use std::fmt;

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::{
    assign_role, resolve_application, resolve_group, resolve_user, select_app_role,
    AppRoleAssignment, AppRoleError, AppRoleResult, AssignmentConfig, AssignmentInputs,
    CredentialResolver, EntityKind, GraphClient, Principal, PrincipalKind, DEFAULT_ROLE_NAME,
};

/// Progress marker of an assignment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    TokenAcquired,
    ApplicationResolved,
    PrincipalResolved,
    RoleSelected,
    Assigned,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::TokenAcquired => "token acquired",
            Self::ApplicationResolved => "application resolved",
            Self::PrincipalResolved => "principal resolved",
            Self::RoleSelected => "role selected",
            Self::Assigned => "assigned",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// A failed run: the error plus the last stage that was reached.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AssignmentFailure {
    pub stage: Stage,
    #[source]
    pub error: AppRoleError,
}

/// Identifiers that must all be present before the write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIds {
    pub application_id: Option<String>,
    pub role_id: Option<String>,
    pub principal_id: Option<String>,
}

impl ResolvedIds {
    /// Names of the identifiers that are absent or empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("applicationId", &self.application_id),
            ("roleId", &self.role_id),
            ("principalId", &self.principal_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }

    fn require(self) -> AppRoleResult<(String, String, String)> {
        let missing = self.missing_fields();
        match (self.application_id, self.role_id, self.principal_id) {
            (Some(app), Some(role), Some(principal)) if missing.is_empty() => {
                Ok((app, role, principal))
            }
            _ => Err(AppRoleError::MissingFields(missing)),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub assignment: AppRoleAssignment,
    pub application_id: String,
    pub app_role_id: String,
    pub role_name: String,
    pub principal: Principal,
    /// Every stage visited, in order.
    pub stages: Vec<Stage>,
}

impl AssignmentOutcome {
    /// One-line status suitable for a CI step summary.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Assigned role '{}' to {} {} on application {}",
            self.role_name,
            self.principal.kind(),
            self.principal.id().unwrap_or_default(),
            self.application_id
        )
    }
}

#[derive(Debug)]
struct Progress {
    stages: Vec<Stage>,
}

impl Progress {
    fn start() -> Self {
        Self {
            stages: vec![Stage::Start],
        }
    }

    fn current(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Start)
    }

    fn advance(&mut self, stage: Stage) {
        info!(from = %self.current(), to = %stage, "Assignment run advanced");
        self.stages.push(stage);
    }
}

/// Runs one app role assignment.
#[derive(Debug)]
pub struct AppRoleAssigner {
    config: AssignmentConfig,
    http_client: reqwest::Client,
}

impl AppRoleAssigner {
    /// Creates an assigner with a default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: AssignmentConfig) -> AppRoleResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("entra-approle/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppRoleError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Creates an assigner that uses the given HTTP client for every call.
    #[must_use]
    pub fn with_http_client(config: AssignmentConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Validates raw inputs and creates an assigner.
    ///
    /// # Errors
    ///
    /// Fails at [`Stage::Start`] when a required input is missing.
    pub fn from_inputs(inputs: AssignmentInputs) -> Result<Self, AssignmentFailure> {
        inputs
            .validate()
            .and_then(Self::new)
            .map_err(|error| AssignmentFailure {
                stage: Stage::Start,
                error,
            })
    }

    #[must_use]
    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    /// Executes the run to completion or to its first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error together with the last stage reached.
    #[instrument(skip(self), fields(
        application = %self.config.application_name,
        principal_kind = %self.config.principal_kind,
        resource = %self.config.resource_name
    ))]
    pub async fn run(&self) -> Result<AssignmentOutcome, AssignmentFailure> {
        let mut progress = Progress::start();

        match self.execute(&mut progress).await {
            Ok(mut outcome) => {
                progress.advance(Stage::Done);
                outcome.stages = progress.stages;
                info!("{}", outcome.message());
                Ok(outcome)
            }
            Err(error) => {
                let stage = progress.current();
                error!(%stage, "Assignment run failed: {error}");
                Err(AssignmentFailure { stage, error })
            }
        }
    }

    async fn execute(&self, progress: &mut Progress) -> AppRoleResult<AssignmentOutcome> {
        let config = &self.config;

        let token = CredentialResolver::new(
            self.http_client.clone(),
            config.login_endpoint(),
            config.graph_endpoint(),
            &config.tenant_id,
            &config.credentials,
        )
        .get_access_token()
        .await?;
        progress.advance(Stage::TokenAcquired);

        let graph = GraphClient::new(
            self.http_client.clone(),
            config.graph_endpoint(),
            config.api_version.as_str(),
        );

        let application = resolve_application(&graph, &token, &config.application_name)
            .await?
            .value
            .into_iter()
            .next()
            .ok_or_else(|| AppRoleError::NotFound {
                entity: EntityKind::Application,
                name: config.application_name.clone(),
            })?;
        progress.advance(Stage::ApplicationResolved);

        let (principals, entity) = match config.principal_kind {
            PrincipalKind::Group => (
                resolve_group(&graph, &token, &config.resource_name).await?,
                EntityKind::Group,
            ),
            PrincipalKind::User => (
                resolve_user(&graph, &token, &config.resource_name).await?,
                EntityKind::User,
            ),
        };
        let principal = principals
            .value
            .first()
            .map(|object| Principal::from_object(config.principal_kind, object))
            .ok_or_else(|| AppRoleError::NotFound {
                entity,
                name: config.resource_name.clone(),
            })?;
        progress.advance(Stage::PrincipalResolved);

        if config.role_name.is_none() {
            info!("No role name configured, defaulting to '{DEFAULT_ROLE_NAME}'");
        }
        let role_name = config.role_name_or_default();
        let selected = select_app_role(&application.app_roles, role_name);
        match selected {
            Some(role) if role.is_disabled() => {
                warn!(role_id = ?role.id, "Role '{role_name}' is disabled on the application");
            }
            Some(_) => {}
            None => {
                let available: Vec<&str> = application
                    .app_roles
                    .iter()
                    .filter_map(|r| r.display_name.as_deref())
                    .collect();
                warn!(?available, "Role '{role_name}' not declared by the application");
            }
        }
        let role_id = selected.and_then(|role| role.id.clone());

        let (application_id, app_role_id, principal_id) = ResolvedIds {
            application_id: application.id.clone(),
            role_id,
            principal_id: principal.id().map(String::from),
        }
        .require()?;
        progress.advance(Stage::RoleSelected);

        let assignment =
            assign_role(&graph, &token, &application_id, &app_role_id, &principal_id).await?;
        progress.advance(Stage::Assigned);

        Ok(AssignmentOutcome {
            assignment,
            application_id,
            app_role_id,
            role_name: role_name.to_string(),
            principal,
            stages: Vec::new(),
        })
    }
}
