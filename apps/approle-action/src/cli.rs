//! Command-line flags. Each flag overrides the matching `INPUT_*` variable.

use std::collections::HashMap;
use std::env::VarError;

use clap::{Parser, ValueEnum};
use entra_approle::{
    AssignmentInputs, INPUT_APPLICATION_NAME, INPUT_AUTHORITY_HOST, INPUT_CLIENT_ID,
    INPUT_CLIENT_SECRET, INPUT_CLOUD, INPUT_GRAPH_API_VERSION, INPUT_GRAPH_ENDPOINT,
    INPUT_RESOURCE_NAME, INPUT_RESOURCE_TYPE, INPUT_ROLE_NAME, INPUT_TENANT_ID,
};

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Assign an Entra ID application role to a user or group.
///
/// Inputs are read from `INPUT_*` environment variables (as set by GitHub
/// Actions) and may be overridden with the flags below.
#[derive(Debug, Parser)]
#[command(name = "approle-assign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// App registration client id [env: INPUT_CLIENT_ID]
    #[arg(long)]
    pub client_id: Option<String>,

    /// App registration client secret; prefer the env variable [env: INPUT_CLIENT_SECRET]
    #[arg(long)]
    pub client_secret: Option<String>,

    /// Directory (tenant) id [env: INPUT_TENANT_ID]
    #[arg(long)]
    pub tenant_id: Option<String>,

    /// Display name of the application's service principal [env: INPUT_APPLICATION_NAME]
    #[arg(long)]
    pub application_name: Option<String>,

    /// "Group" for a group, anything else for a user [env: INPUT_RESOURCE_TYPE]
    #[arg(long)]
    pub resource_type: Option<String>,

    /// Group display name or user principal name [env: INPUT_RESOURCE_NAME]
    #[arg(long)]
    pub resource_name: Option<String>,

    /// App role display name, defaults to "User" [env: INPUT_ROLE_NAME]
    #[arg(long)]
    pub role_name: Option<String>,

    /// commercial, usgovernment, china or germany [env: INPUT_CLOUD]
    #[arg(long)]
    pub cloud: Option<String>,

    /// Override the Azure AD authority host [env: INPUT_AUTHORITY_HOST]
    #[arg(long)]
    pub authority_host: Option<String>,

    /// Override the Microsoft Graph host [env: INPUT_GRAPH_ENDPOINT]
    #[arg(long)]
    pub graph_endpoint: Option<String>,

    /// Graph API version [env: INPUT_GRAPH_API_VERSION]
    #[arg(long)]
    pub graph_api_version: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Flags that were given, keyed by the input variable they replace.
    pub fn input_overrides(&self) -> HashMap<&'static str, String> {
        [
            (INPUT_CLIENT_ID, &self.client_id),
            (INPUT_CLIENT_SECRET, &self.client_secret),
            (INPUT_TENANT_ID, &self.tenant_id),
            (INPUT_APPLICATION_NAME, &self.application_name),
            (INPUT_RESOURCE_TYPE, &self.resource_type),
            (INPUT_RESOURCE_NAME, &self.resource_name),
            (INPUT_ROLE_NAME, &self.role_name),
            (INPUT_CLOUD, &self.cloud),
            (INPUT_AUTHORITY_HOST, &self.authority_host),
            (INPUT_GRAPH_ENDPOINT, &self.graph_endpoint),
            (INPUT_GRAPH_API_VERSION, &self.graph_api_version),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }

    /// Builds inputs from the given flags, reading the rest through `env`.
    ///
    /// A flag wins even when empty, so `--role-name ""` clears an inherited role.
    pub fn inputs<F>(&self, env: F) -> AssignmentInputs
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let overrides = self.input_overrides();
        AssignmentInputs::from_reader(|key| match overrides.get(key) {
            Some(value) => Ok(value.clone()),
            None => env(key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_only_include_given_flags() {
        let cli = Cli::parse_from([
            "approle-assign",
            "--application-name",
            "Payroll",
            "--resource-type",
            "Group",
        ]);
        let overrides = cli.input_overrides();

        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides[INPUT_APPLICATION_NAME], "Payroll");
        assert_eq!(overrides[INPUT_RESOURCE_TYPE], "Group");
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    fn env_with(
        vars: &[(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Result<String, VarError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key: &str| {
            vars.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    fn base_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (INPUT_CLIENT_ID, "client-id"),
            (INPUT_CLIENT_SECRET, "s3cret"),
            (INPUT_TENANT_ID, "tenant-id"),
            (INPUT_APPLICATION_NAME, "Payroll"),
            (INPUT_RESOURCE_TYPE, "Group"),
            (INPUT_RESOURCE_NAME, "Finance"),
            (INPUT_ROLE_NAME, "Approver"),
        ]
    }

    #[test]
    fn test_flag_overrides_env_value() {
        let cli = Cli::parse_from([
            "approle-assign",
            "--resource-name",
            "Accounting",
            "--role-name",
            "Reader",
        ]);
        let config = cli.inputs(env_with(&base_env())).validate().unwrap();

        assert_eq!(config.resource_name, "Accounting");
        assert_eq!(config.role_name_or_default(), "Reader");
        assert_eq!(config.application_name, "Payroll");
    }

    #[test]
    fn test_env_value_used_without_flag() {
        let cli = Cli::parse_from(["approle-assign"]);
        let config = cli.inputs(env_with(&base_env())).validate().unwrap();

        assert_eq!(config.resource_name, "Finance");
        assert_eq!(config.role_name_or_default(), "Approver");
    }

    #[test]
    fn test_empty_role_flag_falls_back_to_default_role() {
        let cli = Cli::parse_from(["approle-assign", "--role-name", ""]);
        let config = cli.inputs(env_with(&base_env())).validate().unwrap();

        assert!(config.role_name.is_none());
        assert_eq!(config.role_name_or_default(), "User");
    }

    #[test]
    fn test_json_log_format() {
        let cli = Cli::parse_from(["approle-assign", "--log-format", "json"]);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(cli.input_overrides().is_empty());
    }
}
