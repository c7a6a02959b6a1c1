//! # Build-Bridge CLI
//!
//! Command-line interface for the Build-Bridge webhook adapter.
//!
//! This module provides CLI commands for:
//! - Validating and inspecting hook configuration
//! - Evaluating path expressions against captured payloads
//! - Dry-running a hook's field mapping
//! - Rendering `{{NAME}}` callback templates

use build_bridge_core::{
    callback::render_template,
    hook_config::{HookConfigError, HookConfiguration},
    mapping::ExtractedParameters,
    path::{PathError, PathExpression},
};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// CLI Structure
// ============================================================================

/// Build-Bridge CLI - webhook-to-build utilities
#[derive(Parser)]
#[command(name = "build-bridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bridge Git hosting webhooks to build jobs")]
#[command(
    long_about = "Build-Bridge receives Bitbucket Server and GitHub webhooks, extracts payload \
                  fields via path expressions, and triggers downstream build jobs"
)]
pub struct Cli {
    /// Logging level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate a hook configuration file
    Config {
        /// Configuration file to validate
        #[arg(long, env = "BB_HOOK_CONFIG")]
        file: PathBuf,

        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Output format for configuration
        #[arg(short = 'f', long, default_value = "yaml")]
        format: ConfigFormat,
    },

    /// Evaluate a path expression against a captured payload
    Extract {
        /// JSON payload file
        payload: PathBuf,

        /// Path expression, e.g. "changes[type=UPDATE].toHash"
        path: String,
    },

    /// Dry-run a hook's field mapping against a captured payload
    Map {
        /// JSON payload file
        payload: PathBuf,

        /// Hook configuration file
        #[arg(short, long, env = "BB_HOOK_CONFIG")]
        config: PathBuf,

        /// Hook identifier
        #[arg(long)]
        hook: String,

        /// Mapping name inside the hook
        #[arg(long)]
        mapping: String,
    },

    /// Render a {{NAME}} template with key=value pairs
    Render {
        /// Template string
        template: String,

        /// Values as NAME=value pairs
        #[arg(value_parser = parse_key_value)]
        values: Vec<(String, String)>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Configuration format options
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse a NAME=value argument.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=value, got '{s}'")),
    }
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] HookConfigError),

    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path expression error: {0}")]
    Path(#[from] PathError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli);

    match cli.command {
        Commands::Config { file, show, format } => execute_config_command(&file, show, format),
        Commands::Extract { payload, path } => execute_extract_command(&payload, &path),
        Commands::Map {
            payload,
            config,
            hook,
            mapping,
        } => execute_map_command(&payload, &config, &hook, &mapping),
        Commands::Render { template, values } => execute_render_command(&template, values),
        Commands::Completions { shell } => execute_completions_command(shell),
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Initialize logging based on CLI arguments
fn initialize_logging(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second init (tests invoking multiple commands) is not an error.
    if cli.json_logs {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Validate a hook configuration file, optionally printing the resolved form.
fn execute_config_command(
    file: &Path,
    show: bool,
    format: ConfigFormat,
) -> Result<(), CliError> {
    let config = HookConfiguration::load_from_file(file)?;

    info!(
        path = %file.display(),
        hooks = config.hooks.len(),
        "Hook configuration is valid"
    );
    println!(
        "Configuration valid: {} hook(s) defined",
        config.hooks.len()
    );

    if show {
        let rendered = match format {
            ConfigFormat::Yaml => {
                serde_yaml::to_string(&config).map_err(|e| CliError::CommandFailed {
                    message: format!("cannot render configuration: {e}"),
                })?
            }
            ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
        };
        println!("{rendered}");
    }

    Ok(())
}

/// Evaluate one path expression against a payload file.
fn execute_extract_command(payload_path: &Path, path: &str) -> Result<(), CliError> {
    let expression = PathExpression::parse(path)?;
    let payload: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(payload_path)?)?;

    match expression.extract_scalar(&payload) {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(CliError::CommandFailed {
            message: format!("path '{path}' did not match the payload"),
        }),
    }
}

/// Apply a hook's named mapping to a payload file and print the result.
fn execute_map_command(
    payload_path: &Path,
    config_path: &Path,
    hook_id: &str,
    mapping_name: &str,
) -> Result<(), CliError> {
    let config = HookConfiguration::load_from_file(config_path)?;

    let hook = config.hook(hook_id).ok_or_else(|| CliError::InvalidArgument {
        arg: "--hook".to_string(),
        message: format!("hook '{hook_id}' is not defined in the configuration"),
    })?;
    let mapping = hook
        .field_mapping(mapping_name)
        .ok_or_else(|| CliError::InvalidArgument {
            arg: "--mapping".to_string(),
            message: format!("mapping '{mapping_name}' is not defined for hook '{hook_id}'"),
        })?;

    let payload: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(payload_path)?)?;
    let parameters = mapping.map(&payload);

    println!("{}", serde_json::to_string_pretty(&parameters)?);
    Ok(())
}

/// Render a template against NAME=value pairs.
fn execute_render_command(
    template: &str,
    values: Vec<(String, String)>,
) -> Result<(), CliError> {
    let parameters: ExtractedParameters = values.into_iter().collect();
    println!("{}", render_template(template, &parameters));
    Ok(())
}

/// Generate shell completions on stdout.
fn execute_completions_command(shell: clap_complete::Shell) -> Result<(), CliError> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
