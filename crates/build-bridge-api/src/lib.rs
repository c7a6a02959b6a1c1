//! # Build-Bridge HTTP Service
//!
//! HTTP server for receiving Git hosting provider webhooks and triggering
//! downstream builds.
//!
//! This service provides:
//! - Per-hook webhook endpoint with optional signature validation
//! - Event routing and payload field extraction
//! - Build trigger invocation and status callbacks
//! - Health check and metrics endpoints

// Public modules
pub mod config;

pub use config::{
    ConfigError, HooksConfig, LoggingConfig, SecretBackend, SecretsConfig, ServerConfig,
    ServiceConfig, TriggerConfig,
};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use build_bridge_core::{
    callback::{BuildStatus, StatusCallbackSender},
    hook_config::{HookConfiguration, HookDefinition},
    mapping::ExtractedParameters,
    routing::RoutingDecision,
    secrets::{SecretStore, SecretStoreError},
    signature::{SignatureError, SignatureValidator},
    trigger::{BuildHandle, BuildTrigger, TriggerError},
    webhook::{WebhookError, WebhookHeaders, WebhookRequest},
    CorrelationId, EventId, Timestamp,
};
use bytes::Bytes;
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::{error, info, instrument, warn};

/// Parameter name for the full commit hash produced by field mappings.
const COMMIT_HASH_PARAM: &str = "LATEST_COMMIT_HASH";

/// Derived parameter carrying the abbreviated (7-character) commit hash.
const SHORT_HASH_PARAM: &str = "LATEST_SHORT_HASH";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Configured hooks, loaded at startup
    pub hooks: Arc<HookConfiguration>,

    /// Secret store for signing secrets and callback credentials
    pub secret_store: Arc<dyn SecretStore>,

    /// Webhook signature validator
    pub signature_validator: Arc<dyn SignatureValidator>,

    /// Downstream build trigger
    pub build_trigger: Arc<dyn BuildTrigger>,

    /// Status callback sender
    pub callback_sender: Arc<StatusCallbackSender>,

    /// Health checker for system monitoring
    pub health_checker: Arc<dyn HealthChecker>,

    /// Metrics collector for observability
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Create new application state
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ServiceConfig,
        hooks: Arc<HookConfiguration>,
        secret_store: Arc<dyn SecretStore>,
        signature_validator: Arc<dyn SignatureValidator>,
        build_trigger: Arc<dyn BuildTrigger>,
        callback_sender: Arc<StatusCallbackSender>,
        health_checker: Arc<dyn HealthChecker>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            config,
            hooks,
            secret_store,
            signature_validator,
            build_trigger,
            callback_sender,
            health_checker,
            metrics,
        }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
///
/// CORS and compression follow the server configuration toggles; the request
/// timeout and body-size limit always apply.
pub fn create_router(state: AppState) -> Router {
    let server = state.config.server.clone();

    let webhook_routes = Router::new().route("/webhook/{hook_id}", post(handle_webhook));

    let health_routes = Router::new()
        .route("/health", get(handle_health_check))
        .route("/ready", get(handle_readiness_check));

    let observability_routes = Router::new().route("/metrics", get(metrics_endpoint));

    let mut router = Router::new()
        .merge(webhook_routes)
        .merge(health_routes)
        .merge(observability_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(std::time::Duration::from_secs(
                    server.timeout_seconds,
                )))
                .layer(axum::middleware::from_fn(request_logging_middleware))
                .layer(axum::extract::DefaultBodyLimit::max(server.max_body_size))
                .into_inner(),
        );

    if server.enable_compression {
        router = router.layer(CompressionLayer::new());
    }
    if server.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

/// Start HTTP server with graceful shutdown
pub async fn start_server(state: AppState) -> Result<(), ServiceError> {
    let server = state.config.server.clone();
    let app = create_router(state);

    let address = format!("{}:{}", server.host, server.port);
    let listener =
        tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: address.clone(),
                message: e.to_string(),
            })?;

    info!("Starting HTTP server on {}", address);

    let shutdown_timeout = std::time::Duration::from_secs(server.shutdown_timeout_seconds);

    let shutdown_signal = async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
        }
    };

    // In-flight requests complete before the server exits; new connections
    // stop being accepted as soon as the signal arrives.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Webhook Handler
// ============================================================================

/// Handle a webhook delivery for one configured hook.
///
/// The pipeline runs in a fixed order:
/// 1. Resolve the hook from the URL path
/// 2. Detect the provider from the event header
/// 3. Short-circuit provider configuration pings
/// 4. Validate the signature over the raw body (when the hook has a
///    signing secret)
/// 5. Parse the payload and resolve the routing table
/// 6. Apply the field mapping and trigger the build
/// 7. Spawn the status callback (best effort, never fails the response)
///
/// Unrouted events are acknowledged with `200 OK` so providers do not
/// retry deliveries the bridge deliberately ignores.
#[instrument(skip(state, headers, body), fields(hook_id = %hook_id))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    Path(hook_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookHandlerError> {
    state.metrics.webhook_requests_total.inc();
    let timer = state.metrics.webhook_duration_seconds.start_timer();

    let correlation_id = headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| uuid::Uuid::parse_str(s).ok())
        .map(CorrelationId::from_uuid)
        .unwrap_or_default();

    let hook = state
        .hooks
        .hook(&hook_id)
        .ok_or_else(|| WebhookHandlerError::UnknownHook {
            hook_id: hook_id.clone(),
        })?;

    let webhook_headers =
        WebhookHeaders::from_lookup(|name| headers.get(name).and_then(|v| v.to_str().ok()))
            .map_err(WebhookHandlerError::InvalidHeaders)?;

    if let Some(expected) = hook.provider {
        if expected != webhook_headers.provider {
            state.metrics.webhook_validation_failures.inc();
            return Err(WebhookHandlerError::InvalidHeaders(
                WebhookError::ProviderMismatch {
                    expected,
                    actual: webhook_headers.provider,
                },
            ));
        }
    }

    let webhook = WebhookRequest::new(webhook_headers, body);

    info!(
        event_id = %webhook.id,
        provider = %webhook.headers.provider,
        event = %webhook.headers.event_key,
        correlation_id = %correlation_id,
        "Received webhook request"
    );

    // Pings confirm hook configuration; they carry no payload worth
    // validating and are answered before the signature check.
    if webhook.headers.is_ping() {
        timer.observe_duration();
        return Ok(Json(WebhookResponse {
            event_id: webhook.id,
            status: "ok".to_string(),
            message: "Webhook configured successfully".to_string(),
            build_id: None,
            build_url: None,
        }));
    }

    if let Some(secret_name) = &hook.signing_secret {
        let secret = state
            .secret_store
            .get_secret(secret_name)
            .await
            .map_err(WebhookHandlerError::SecretUnavailable)?;

        let Some(signature) = webhook.headers.signature.as_deref() else {
            state.metrics.webhook_validation_failures.inc();
            return Err(WebhookHandlerError::MissingSignature);
        };

        state
            .signature_validator
            .validate_signature(&webhook.body, signature, secret.expose())
            .await
            .map_err(|e| {
                state.metrics.webhook_validation_failures.inc();
                WebhookHandlerError::InvalidSignature(e)
            })?;
    }

    let payload = webhook
        .parse_payload()
        .map_err(|e| WebhookHandlerError::MalformedPayload {
            message: e.to_string(),
        })?;

    let action = webhook.headers.provider.action_of(&payload);
    let route = match hook.routes.resolve(&webhook.headers.event_key, action) {
        RoutingDecision::Matched(route) => route,
        RoutingDecision::Ignored => {
            state.metrics.events_ignored_total.inc();
            info!(
                event = %webhook.headers.event_key,
                action = action.unwrap_or("-"),
                "No route configured for event, acknowledging without action"
            );
            timer.observe_duration();
            return Ok(Json(WebhookResponse {
                event_id: webhook.id,
                status: "ignored".to_string(),
                message: "Event is not routed by this hook".to_string(),
                build_id: None,
                build_url: None,
            }));
        }
    };

    // Configuration validation guarantees the mapping exists; a miss here is
    // a bug, not a client error.
    let mapping =
        hook.field_mapping(&route.mapping)
            .ok_or_else(|| WebhookHandlerError::Internal {
                message: format!("route references missing mapping '{}'", route.mapping),
            })?;

    let mut parameters = mapping.map(&payload);
    for parameter in &hook.static_parameters {
        if parameters.get(&parameter.name).is_none() {
            parameters.set(&parameter.name, parameter.value.clone());
        }
    }
    derive_short_hash(&mut parameters);

    let handle = state
        .build_trigger
        .trigger_build(&hook.job, &parameters, &correlation_id)
        .await
        .map_err(|e| {
            state.metrics.build_trigger_failures.inc();
            WebhookHandlerError::TriggerFailed(e)
        })?;

    state.metrics.builds_triggered_total.inc();
    info!(
        event_id = %webhook.id,
        job = %hook.job,
        build_id = %handle.build_id,
        correlation_id = %correlation_id,
        "Build triggered"
    );

    spawn_status_callback(&state, hook, &parameters, &handle);

    timer.observe_duration();
    Ok(Json(WebhookResponse {
        event_id: webhook.id,
        status: "triggered".to_string(),
        message: format!("Triggered build job '{}'", hook.job),
        build_id: Some(handle.build_id),
        build_url: handle.build_url,
    }))
}

/// Derive the abbreviated commit hash parameter when the full hash is
/// present in the extracted set.
fn derive_short_hash(parameters: &mut ExtractedParameters) {
    let short = parameters
        .get(COMMIT_HASH_PARAM)
        .map(|hash| hash.get(..7).unwrap_or(hash).to_string());
    if let Some(short) = short {
        parameters.set(SHORT_HASH_PARAM, short);
    }
}

/// Spawn the status callback for a triggered build.
///
/// The callback runs detached from the request: failures are logged and
/// counted, never surfaced to the provider.
fn spawn_status_callback(
    state: &AppState,
    hook: &HookDefinition,
    parameters: &ExtractedParameters,
    handle: &BuildHandle,
) {
    let Some(callback) = hook.callback.clone() else {
        return;
    };

    let mut values = parameters.clone();
    values.set("BUILD_STATUS", BuildStatus::InProgress.as_str().to_string());
    values.set("BUILD_ID", handle.build_id.clone());
    values.set(
        "CALLBACK_DESCRIPTION",
        format!("Build job '{}' started", hook.job),
    );
    if let Some(url) = &handle.build_url {
        values.set("BUILD_URL", url.clone());
    }

    let sender = Arc::clone(&state.callback_sender);
    let secrets = Arc::clone(&state.secret_store);
    let metrics = Arc::clone(&state.metrics);

    tokio::spawn(async move {
        if let Err(e) = sender.send(&callback, &values, secrets.as_ref()).await {
            metrics.callback_failures_total.inc();
            warn!(error = %e, "Status callback delivery failed");
        }
    });
}

// ============================================================================
// Health Check Handlers
// ============================================================================

/// Basic health check endpoint
#[instrument(skip(state))]
async fn handle_health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let status = state.health_checker.check_basic_health().await;

    let response = HealthResponse {
        status: if status.is_healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        timestamp: Timestamp::now(),
        checks: status.checks,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    if status.is_healthy {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Readiness check for load balancers
#[instrument(skip(state))]
async fn handle_readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, StatusCode> {
    let is_ready = state.health_checker.check_readiness().await;

    let response = ReadinessResponse {
        ready: is_ready,
        timestamp: Timestamp::now(),
    };

    if is_ready {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

// ============================================================================
// Observability Handlers
// ============================================================================

/// Prometheus metrics endpoint
#[instrument(skip_all)]
async fn metrics_endpoint(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .encode()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware with correlation ID tracking
///
/// Extracts or generates a correlation ID, logs request start and
/// completion with structured fields, and propagates the ID through the
/// response headers.
#[instrument(skip(request, next), fields(
    method = %request.method(),
    uri = %request.uri(),
    correlation_id
))]
async fn request_logging_middleware(
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());
    request.extensions_mut().insert(correlation_id.clone());

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    let status = response.status();

    if status.is_server_error() {
        error!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            correlation_id = %correlation_id,
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed successfully"
        );
    }

    response
}

// ============================================================================
// Response Types
// ============================================================================

/// Webhook processing response
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub event_id: EventId,
    pub status: String,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_url: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: Timestamp,
    pub checks: HashMap<String, HealthCheckResult>,
    pub version: String,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub timestamp: Timestamp,
}

/// Health check result for individual components
#[derive(Debug, Serialize, Clone)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub message: String,
    pub duration_ms: u64,
}

/// Overall health status
#[derive(Debug)]
pub struct HealthStatus {
    pub is_healthy: bool,
    pub checks: HashMap<String, HealthCheckResult>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Webhook handler errors with HTTP status code mapping
///
/// - `400 Bad Request`: permanent client errors (unrecognized headers,
///   malformed payloads)
/// - `401 Unauthorized`: missing or failed signature validation
/// - `404 Not Found`: the URL names a hook that is not configured
/// - `500 Internal Server Error`: secret store failures and bugs
/// - `502 Bad Gateway`: the build system rejected or never answered the
///   trigger request
///
/// Messages returned to clients are the error display form; secret store
/// details are logged server-side and replaced with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// The URL path names a hook that is not configured
    #[error("Unknown hook '{hook_id}'")]
    UnknownHook { hook_id: String },

    /// Missing or unrecognized provider headers
    #[error("Invalid headers: {0}")]
    InvalidHeaders(#[from] WebhookError),

    /// The request body is not a JSON object
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// The hook requires a signature but none was sent
    #[error("Signature required but not provided")]
    MissingSignature,

    /// Signature validation failed
    #[error("Signature validation failed: {0}")]
    InvalidSignature(#[from] SignatureError),

    /// The signing secret could not be resolved
    #[error("Secret store unavailable")]
    SecretUnavailable(#[source] SecretStoreError),

    /// The build system rejected the trigger request
    #[error("Build trigger failed: {0}")]
    TriggerFailed(#[from] TriggerError),

    /// Unexpected internal server error
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl axum::response::IntoResponse for WebhookHandlerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Self::UnknownHook { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            Self::InvalidHeaders(_) | Self::MalformedPayload { .. } => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::MissingSignature | Self::InvalidSignature(_) => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Self::SecretUnavailable(ref e) => {
                error!(error = %e, "Secret store failure during webhook handling");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Secret store unavailable. Please try again later.".to_string(),
                )
            }
            Self::TriggerFailed(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            Self::Internal { ref message } => {
                error!(error = %message, "Internal server error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error occurred. Please try again later.".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        (status, Json(body)).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Metrics initialization failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

// ============================================================================
// Health Checking
// ============================================================================

/// Interface for system health monitoring
#[async_trait::async_trait]
pub trait HealthChecker: Send + Sync {
    /// Basic health check (fast)
    async fn check_basic_health(&self) -> HealthStatus;

    /// Readiness check for load balancers
    async fn check_readiness(&self) -> bool;
}

/// Health checker backed by the service's own dependencies.
pub struct DefaultHealthChecker {
    secret_store: Arc<dyn SecretStore>,
    build_trigger: Arc<dyn BuildTrigger>,
}

impl DefaultHealthChecker {
    pub fn new(secret_store: Arc<dyn SecretStore>, build_trigger: Arc<dyn BuildTrigger>) -> Self {
        Self {
            secret_store,
            build_trigger,
        }
    }
}

#[async_trait::async_trait]
impl HealthChecker for DefaultHealthChecker {
    async fn check_basic_health(&self) -> HealthStatus {
        let start = std::time::Instant::now();
        let mut checks = HashMap::new();

        // If we can answer at all, the service itself is alive.
        checks.insert(
            "service".to_string(),
            HealthCheckResult {
                healthy: true,
                message: "Service is running".to_string(),
                duration_ms: start.elapsed().as_millis() as u64,
            },
        );

        HealthStatus {
            is_healthy: true,
            checks,
        }
    }

    async fn check_readiness(&self) -> bool {
        let secrets_ready = self.secret_store.health_check().await.is_ok();
        let trigger_ready = self.build_trigger.health_check().await.is_ok();

        if !secrets_ready {
            warn!("Readiness check failed: secret store unavailable");
        }
        if !trigger_ready {
            warn!("Readiness check failed: build system unavailable");
        }

        secrets_ready && trigger_ready
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Service metrics for observability.
///
/// Owns its own registry so repeated construction (tests, restarts inside
/// one process) never collides with previously registered collectors.
#[derive(Debug)]
pub struct ServiceMetrics {
    registry: Registry,

    /// Webhook deliveries received, any outcome
    pub webhook_requests_total: IntCounter,

    /// Deliveries rejected during header or signature validation
    pub webhook_validation_failures: IntCounter,

    /// Deliveries acknowledged without a matching route
    pub events_ignored_total: IntCounter,

    /// Builds started downstream
    pub builds_triggered_total: IntCounter,

    /// Trigger requests the build system rejected
    pub build_trigger_failures: IntCounter,

    /// Status callbacks that could not be delivered
    pub callback_failures_total: IntCounter,

    /// End-to-end webhook handling time
    pub webhook_duration_seconds: Histogram,
}

impl ServiceMetrics {
    pub fn new() -> Result<Arc<Self>, prometheus::Error> {
        let registry = Registry::new();

        let webhook_requests_total = IntCounter::new(
            "webhook_requests_total",
            "Total webhook deliveries received",
        )?;
        let webhook_validation_failures = IntCounter::new(
            "webhook_validation_failures",
            "Deliveries rejected during validation",
        )?;
        let events_ignored_total = IntCounter::new(
            "events_ignored_total",
            "Deliveries acknowledged without a matching route",
        )?;
        let builds_triggered_total =
            IntCounter::new("builds_triggered_total", "Builds started downstream")?;
        let build_trigger_failures = IntCounter::new(
            "build_trigger_failures",
            "Trigger requests rejected by the build system",
        )?;
        let callback_failures_total = IntCounter::new(
            "callback_failures_total",
            "Status callbacks that could not be delivered",
        )?;
        let webhook_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "webhook_duration_seconds",
                "Webhook handling time distribution",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0]),
        )?;

        registry.register(Box::new(webhook_requests_total.clone()))?;
        registry.register(Box::new(webhook_validation_failures.clone()))?;
        registry.register(Box::new(events_ignored_total.clone()))?;
        registry.register(Box::new(builds_triggered_total.clone()))?;
        registry.register(Box::new(build_trigger_failures.clone()))?;
        registry.register(Box::new(callback_failures_total.clone()))?;
        registry.register(Box::new(webhook_duration_seconds.clone()))?;

        Ok(Arc::new(Self {
            registry,
            webhook_requests_total,
            webhook_validation_failures,
            events_ignored_total,
            builds_triggered_total,
            build_trigger_failures,
            callback_failures_total,
            webhook_duration_seconds,
        }))
    }

    /// Render the registry in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
