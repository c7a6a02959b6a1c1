//! # Build-Bridge Service
//!
//! Binary entry point for the Build-Bridge HTTP service.
//!
//! This executable:
//! - Loads configuration from environment and files
//! - Initializes logging
//! - Loads the hook configuration and wires secret store, signature
//!   validator, and build trigger
//! - Starts the HTTP server from build-bridge-api

use build_bridge_api::{
    start_server, AppState, DefaultHealthChecker, SecretBackend, ServiceConfig, ServiceError,
    ServiceMetrics,
};
use build_bridge_core::{
    adapters::{EnvSecretStore, HttpBuildTrigger, InMemorySecretStore},
    callback::StatusCallbackSender,
    hook_config::HookConfiguration,
    secrets::{SecretName, SecretStore},
    signature::HmacSha256Validator,
    trigger::BuildTrigger,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "build_bridge_service=info,build_bridge_api=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Build-Bridge Service");

    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order — later sources override earlier ones):
    //  1. /etc/build-bridge/service.yaml   — system-wide defaults
    //  2. ./config/service.yaml            — deployment-local override
    //  3. Path given by BB_CONFIG_FILE env — operator-specified file
    //  4. Environment variables prefixed BB__ (double-underscore separator)
    //     e.g. BB__SERVER__PORT=9090 sets server.port = 9090
    //
    // All service configuration fields carry serde defaults, so absent files
    // or an entirely unconfigured environment produces a valid service config
    // with built-in defaults.  A malformed file or an environment variable
    // that cannot be coerced to the correct type IS a hard error because it
    // indicates deliberate-but-broken operator configuration.
    // -------------------------------------------------------------------------
    let mut config_builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/build-bridge/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    // Optional explicit path supplied by the operator.
    if let Ok(explicit_path) = std::env::var("BB_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            config_builder = config_builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
            info!(path = %explicit_path, "Loading configuration from explicit path");
        }
    }

    let config = match config_builder
        .add_source(config::Environment::with_prefix("BB").separator("__"))
        .build()
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Failed to build configuration; aborting");
            std::process::exit(3);
        }
    };

    let service_config: ServiceConfig = match config.try_deserialize() {
        Ok(sc) => sc,
        Err(e) => {
            error!(
                error = %e,
                "Could not deserialize service configuration; aborting. \
                 Fix the configuration and restart."
            );
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    // -------------------------------------------------------------------------
    // Load hook configuration
    //
    // BB_HOOK_CONFIGURATION may carry the document inline (useful for
    // containerized deployments without a mounted file); otherwise the path
    // from the service configuration is read.
    // -------------------------------------------------------------------------
    let hooks = match load_hooks(&service_config) {
        Ok(hooks) => hooks,
        Err(e) => {
            error!(error = %e, "Could not load hook configuration; aborting");
            std::process::exit(3);
        }
    };

    if hooks.hooks.is_empty() {
        warn!("No hooks configured; every webhook delivery will answer 404");
    }

    // -------------------------------------------------------------------------
    // Wire dependencies: secret store, build trigger, callback sender
    // -------------------------------------------------------------------------
    let secret_store = match init_secret_store(&service_config).await {
        Ok(store) => store,
        Err(message) => {
            error!(error = %message, "Could not initialize secret store; aborting");
            std::process::exit(3);
        }
    };

    let build_trigger = match init_build_trigger(&service_config, secret_store.as_ref()).await {
        Ok(trigger) => trigger,
        Err(message) => {
            error!(error = %message, "Could not initialize build trigger; aborting");
            std::process::exit(3);
        }
    };

    let callback_sender = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(
            service_config.trigger.timeout_seconds,
        ))
        .build()
    {
        Ok(client) => Arc::new(StatusCallbackSender::with_client(client)),
        Err(e) => {
            error!(error = %e, "Could not initialize callback HTTP client; aborting");
            std::process::exit(3);
        }
    };

    let metrics = match ServiceMetrics::new() {
        Ok(metrics) => metrics,
        Err(e) => {
            error!(error = %e, "Could not initialize metrics; aborting");
            std::process::exit(4);
        }
    };

    let health_checker = Arc::new(DefaultHealthChecker::new(
        Arc::clone(&secret_store),
        Arc::clone(&build_trigger),
    ));

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        hooks = hooks.hooks.len(),
        "Starting HTTP server"
    );

    let state = AppState::new(
        service_config,
        Arc::new(hooks),
        secret_store,
        Arc::new(HmacSha256Validator::new()),
        build_trigger,
        callback_sender,
        health_checker,
        metrics,
    );

    // Start the server
    if let Err(e) = start_server(state).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
            ServiceError::Metrics(_) => 4,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}

// ============================================================================
// Private helpers
// ============================================================================

/// Load the hook configuration from the inline environment variable or the
/// configured file path.
fn load_hooks(config: &ServiceConfig) -> Result<HookConfiguration, String> {
    if let Ok(inline) = std::env::var("BB_HOOK_CONFIGURATION") {
        if !inline.is_empty() {
            info!("Loading hook configuration from BB_HOOK_CONFIGURATION");
            return HookConfiguration::from_yaml(&inline).map_err(|e| e.to_string());
        }
    }

    match &config.hooks.config_file {
        Some(path) => HookConfiguration::load_from_file(std::path::Path::new(path))
            .map_err(|e| e.to_string()),
        None => Ok(HookConfiguration::default()),
    }
}

/// Build the configured secret store backend.
async fn init_secret_store(config: &ServiceConfig) -> Result<Arc<dyn SecretStore>, String> {
    match config.secrets.backend {
        SecretBackend::Memory => {
            warn!("Using the in-memory secret store; secrets must be seeded programmatically");
            Ok(Arc::new(InMemorySecretStore::new()))
        }
        SecretBackend::Env => Ok(Arc::new(EnvSecretStore::with_prefix(
            config.secrets.env_prefix.clone(),
        ))),
        #[cfg(feature = "aws")]
        SecretBackend::Aws => {
            info!("Using AWS Secrets Manager secret store");
            Ok(Arc::new(
                build_bridge_core::adapters::AwsSecretsManagerStore::from_env().await,
            ))
        }
        #[cfg(not(feature = "aws"))]
        SecretBackend::Aws => Err(
            "secrets.backend = 'aws' requires a build with the 'aws' feature enabled".to_string(),
        ),
    }
}

/// Build the HTTP build trigger, resolving the optional bearer token.
async fn init_build_trigger(
    config: &ServiceConfig,
    secret_store: &dyn SecretStore,
) -> Result<Arc<dyn BuildTrigger>, String> {
    let base_url =
        url::Url::parse(&config.trigger.base_url).map_err(|e| format!("trigger.base_url: {e}"))?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(
            config.trigger.timeout_seconds,
        ))
        .build()
        .map_err(|e| format!("trigger HTTP client: {e}"))?;

    let mut trigger = HttpBuildTrigger::new(base_url).with_client(client);

    if let Some(token_secret) = &config.trigger.token_secret {
        let name = SecretName::new(token_secret.clone()).map_err(|e| e.to_string())?;
        let token = secret_store
            .get_secret(&name)
            .await
            .map_err(|e| format!("trigger token secret: {e}"))?;
        trigger = trigger.with_token(token);
    }

    Ok(Arc::new(trigger))
}
