//! approle-assign - assigns an Entra ID application role from a CI pipeline.
//!
//! Reads `INPUT_*` variables (GitHub Actions inputs), optionally overridden by
//! flags, performs one app role assignment and reports the result through
//! stdout, `GITHUB_OUTPUT` and the process exit code.

use clap::Parser;
use entra_approle::AppRoleAssigner;

mod cli;
mod logging;
mod outcome;

use cli::Cli;
use outcome::ActionReporter;

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init_logging(cli.log_format);

    let inputs = cli.inputs(|key| std::env::var(key));

    let reporter = ActionReporter::from_env();
    let code = match AppRoleAssigner::from_inputs(inputs) {
        Ok(assigner) => match assigner.run().await {
            Ok(outcome) => reporter.success(&outcome),
            Err(failure) => reporter.failure(&failure),
        },
        Err(failure) => reporter.failure(&failure),
    };

    std::process::exit(code);
}
