//! Reports the run result to the hosting CI system.
//!
//! On GitHub Actions, step outputs are appended to the file named by
//! `GITHUB_OUTPUT` and failures are annotated with an `::error::` command.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use entra_approle::{AppRoleError, AssignmentFailure, AssignmentOutcome};
use tracing::warn;

/// Exit codes:
/// - 0: Success
/// - 1: Configuration error
/// - 2: Authentication or authorization failure
/// - 3: Network error (no HTTP response, token or Graph)
/// - 4: Validation error (not found, missing field, rejected request)
/// - 5: Upstream server error
pub fn exit_code(error: &AppRoleError) -> i32 {
    match error {
        AppRoleError::Config(_) => 1,
        AppRoleError::Auth { status: None, .. } => 3,
        AppRoleError::Auth { .. } => 2,
        AppRoleError::GraphRequest(failure) | AppRoleError::Assignment(failure) => {
            match failure.status {
                None => 3,
                Some(status) if status >= 500 => 5,
                Some(401 | 403) => 2,
                Some(_) => 4,
            }
        }
        AppRoleError::NotFound { .. } | AppRoleError::MissingFields(_) => 4,
    }
}

/// Writes step outputs and prints the user-visible result.
#[derive(Debug, Default)]
pub struct ActionReporter {
    output_file: Option<PathBuf>,
}

impl ActionReporter {
    pub fn from_env() -> Self {
        Self {
            output_file: std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from),
        }
    }

    #[cfg(test)]
    fn with_output_file(path: PathBuf) -> Self {
        Self {
            output_file: Some(path),
        }
    }

    /// Prints the created assignment and records `message` and `assignment-id`.
    pub fn success(&self, outcome: &AssignmentOutcome) -> i32 {
        let message = outcome.message();
        println!("{message}");
        match serde_json::to_string_pretty(&outcome.assignment) {
            Ok(payload) => println!("{payload}"),
            Err(e) => warn!("Could not render assignment payload: {e}"),
        }

        self.set_output("message", &message);
        if let Some(id) = outcome.assignment.id.as_deref() {
            self.set_output("assignment-id", id);
        }
        0
    }

    /// Annotates the failure and returns the process exit code.
    pub fn failure(&self, failure: &AssignmentFailure) -> i32 {
        let message = failure.to_string();
        println!("::error::{}", escape_data(&message));
        self.set_output("message", &message);
        exit_code(&failure.error)
    }

    fn set_output(&self, name: &str, value: &str) {
        let Some(path) = &self.output_file else {
            return;
        };
        if let Err(e) = append_output(path, name, value) {
            warn!(path = %path.display(), "Failed to write step output '{name}': {e}");
        }
    }
}

fn append_output(path: &Path, name: &str, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(format_output(name, value).as_bytes())
}

/// Formats one `GITHUB_OUTPUT` entry, using the heredoc form for multi-line values.
pub fn format_output(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{name}={value}\n");
    }

    let mut delimiter = String::from("APPROLE_EOF");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Escapes a workflow command message.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
