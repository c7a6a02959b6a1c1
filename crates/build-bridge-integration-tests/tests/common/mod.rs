//! Common test utilities for build-bridge integration tests
//!
//! This module provides:
//! - Application state builders wired with in-memory adapters
//! - HMAC signature fixtures for signed delivery tests
//! - Helpers for driving the router and reading response bodies

use axum::body::Body;
use axum::http::{Request, Response};
use build_bridge_api::{
    create_router, AppState, DefaultHealthChecker, ServiceConfig, ServiceMetrics,
};
use build_bridge_core::{
    adapters::{InMemorySecretStore, RecordingBuildTrigger},
    callback::StatusCallbackSender,
    hook_config::HookConfiguration,
    signature::HmacSha256Validator,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use tower::ServiceExt;

/// Everything a test needs to drive the service and observe its effects.
#[allow(dead_code)]
pub struct TestHarness {
    pub router: axum::Router,
    pub trigger: Arc<RecordingBuildTrigger>,
    pub secret_store: Arc<InMemorySecretStore>,
}

/// Build a harness around the given hook configuration document.
#[allow(dead_code)]
pub fn harness(hooks_yaml: &str) -> TestHarness {
    let hooks = HookConfiguration::from_yaml(hooks_yaml).expect("test hook configuration");
    let secret_store = Arc::new(InMemorySecretStore::new());
    let trigger = Arc::new(RecordingBuildTrigger::new());
    let metrics = ServiceMetrics::new().expect("metrics registry");

    let state = AppState::new(
        ServiceConfig::default(),
        Arc::new(hooks),
        secret_store.clone(),
        Arc::new(HmacSha256Validator::new()),
        trigger.clone(),
        Arc::new(StatusCallbackSender::new()),
        Arc::new(DefaultHealthChecker::new(
            secret_store.clone(),
            trigger.clone(),
        )),
        metrics,
    );

    TestHarness {
        router: create_router(state),
        trigger,
        secret_store,
    }
}

/// Compute a `sha256=<hex>` signature the way providers sign deliveries.
#[allow(dead_code)]
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// POST a payload to a hook endpoint with the given headers.
#[allow(dead_code)]
pub async fn post_webhook(
    router: axum::Router,
    hook_id: &str,
    headers: &[(&str, &str)],
    body: &str,
) -> Response<Body> {
    let mut request = Request::post(format!("/webhook/{hook_id}"));
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    router
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = http_body_util::BodyExt::collect(response.into_body())
        .await
        .unwrap()
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
