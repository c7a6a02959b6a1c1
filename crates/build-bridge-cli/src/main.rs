//! Binary entry point for the Build-Bridge CLI.

use build_bridge_cli::{run_cli, CliError};

#[tokio::main]
async fn main() {
    if let Err(e) = run_cli().await {
        eprintln!("Error: {e}");

        let exit_code = match e {
            CliError::Configuration(_) => 1,
            CliError::CommandFailed { .. } => 3,
            CliError::InvalidArgument { .. } => 4,
            CliError::Io(_) => 5,
            CliError::Path(_) => 6,
            CliError::Json(_) => 7,
        };

        std::process::exit(exit_code);
    }
}
