//! End-to-end tests for the webhook delivery pipeline
//!
//! These drive the full router: headers, signature validation, routing,
//! field extraction, and the build trigger call.

mod common;

use axum::http::StatusCode;
use build_bridge_core::trigger::TriggerError;
use common::{harness, post_webhook, response_json, sign};

const SIGNED_HOOKS: &str = r#"
hooks:
  team-svc:
    provider: bitbucket
    signing_secret: team-svc-signing
    job: svc-build
    routes:
      - event: "repo:refs_changed"
        mapping: push
    mappings:
      push:
        fields:
          - name: LATEST_COMMIT_HASH
            path: "changes[type=UPDATE].toHash"
          - name: BRANCH
            path: "changes[type=UPDATE].ref.displayId"
    static_parameters:
      - name: ENVIRONMENT
        value: staging
"#;

const PUSH_PAYLOAD: &str = r#"{
  "eventKey": "repo:refs_changed",
  "changes": [
    {"type": "ADD", "toHash": "000000"},
    {"type": "UPDATE", "toHash": "abcdef0123456789", "ref": {"displayId": "main"}}
  ]
}"#;

/// Verify a correctly signed push extracts parameters and triggers the job.
#[tokio::test]
async fn test_signed_push_triggers_build_with_extracted_parameters() {
    let h = harness(SIGNED_HOOKS);
    h.secret_store.insert("team-svc-signing", "s3cret").await;

    let signature = sign(PUSH_PAYLOAD.as_bytes(), "s3cret");
    let response = post_webhook(
        h.router,
        "team-svc",
        &[
            ("x-event-key", "repo:refs_changed"),
            ("x-hub-signature-256", &signature),
        ],
        PUSH_PAYLOAD,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "triggered");

    let calls = h.trigger.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].job, "svc-build");
    assert_eq!(
        calls[0].parameters.get("LATEST_COMMIT_HASH"),
        Some("abcdef0123456789")
    );
    assert_eq!(calls[0].parameters.get("BRANCH"), Some("main"));
    assert_eq!(calls[0].parameters.get("ENVIRONMENT"), Some("staging"));
}

/// Verify the abbreviated commit hash is derived alongside the full hash.
#[tokio::test]
async fn test_short_hash_is_derived_from_commit_hash() {
    let h = harness(SIGNED_HOOKS);
    h.secret_store.insert("team-svc-signing", "s3cret").await;

    let signature = sign(PUSH_PAYLOAD.as_bytes(), "s3cret");
    let response = post_webhook(
        h.router,
        "team-svc",
        &[
            ("x-event-key", "repo:refs_changed"),
            ("x-hub-signature-256", &signature),
        ],
        PUSH_PAYLOAD,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = h.trigger.calls().await;
    assert_eq!(
        calls[0].parameters.get("LATEST_SHORT_HASH"),
        Some("abcdef0")
    );
}

/// Verify a tampered signature is rejected without touching the trigger.
#[tokio::test]
async fn test_tampered_signature_is_unauthorized() {
    let h = harness(SIGNED_HOOKS);
    h.secret_store.insert("team-svc-signing", "s3cret").await;

    let signature = sign(b"different body", "s3cret");
    let response = post_webhook(
        h.router,
        "team-svc",
        &[
            ("x-event-key", "repo:refs_changed"),
            ("x-hub-signature-256", &signature),
        ],
        PUSH_PAYLOAD,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(h.trigger.call_count().await, 0);
}

/// Verify a missing signature on a signing hook is rejected.
#[tokio::test]
async fn test_missing_signature_is_unauthorized() {
    let h = harness(SIGNED_HOOKS);
    h.secret_store.insert("team-svc-signing", "s3cret").await;

    let response = post_webhook(
        h.router,
        "team-svc",
        &[("x-event-key", "repo:refs_changed")],
        PUSH_PAYLOAD,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(h.trigger.call_count().await, 0);
}

/// Verify an unavailable signing secret is an internal error, not a bypass.
#[tokio::test]
async fn test_unavailable_signing_secret_is_internal_error() {
    let h = harness(SIGNED_HOOKS);

    let signature = sign(PUSH_PAYLOAD.as_bytes(), "s3cret");
    let response = post_webhook(
        h.router,
        "team-svc",
        &[
            ("x-event-key", "repo:refs_changed"),
            ("x-hub-signature-256", &signature),
        ],
        PUSH_PAYLOAD,
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(h.trigger.call_count().await, 0);
}

/// Verify a hook without a signing secret ignores any signature header.
#[tokio::test]
async fn test_unsigned_hook_ignores_signature_header() {
    let hooks = r#"
hooks:
  team-svc:
    job: svc-build
    routes:
      - event: "repo:refs_changed"
        mapping: push
    mappings:
      push:
        fields:
          - name: LATEST_COMMIT_HASH
            path: "changes[type=UPDATE].toHash"
"#;

    // The signature header carries garbage; with validation disabled it must
    // not be inspected at all.
    let h = harness(hooks);
    let response = post_webhook(
        h.router,
        "team-svc",
        &[
            ("x-event-key", "repo:refs_changed"),
            ("x-hub-signature-256", "sha256=deadbeef-not-a-real-signature"),
        ],
        PUSH_PAYLOAD,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "triggered");
    assert_eq!(h.trigger.call_count().await, 1);
}

/// Verify an event with no matching route is acknowledged and dropped.
#[tokio::test]
async fn test_unrouted_event_is_acknowledged_and_ignored() {
    let h = harness(SIGNED_HOOKS);
    h.secret_store.insert("team-svc-signing", "s3cret").await;

    let payload = r#"{"eventKey": "pr:opened"}"#;
    let signature = sign(payload.as_bytes(), "s3cret");
    let response = post_webhook(
        h.router,
        "team-svc",
        &[
            ("x-event-key", "pr:opened"),
            ("x-hub-signature-256", &signature),
        ],
        payload,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ignored");
    assert_eq!(h.trigger.call_count().await, 0);
}

/// Verify a malformed JSON payload with a valid signature is a bad request.
#[tokio::test]
async fn test_malformed_payload_is_bad_request() {
    let h = harness(SIGNED_HOOKS);
    h.secret_store.insert("team-svc-signing", "s3cret").await;

    let payload = "not json";
    let signature = sign(payload.as_bytes(), "s3cret");
    let response = post_webhook(
        h.router,
        "team-svc",
        &[
            ("x-event-key", "repo:refs_changed"),
            ("x-hub-signature-256", &signature),
        ],
        payload,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Verify a ping delivery is acknowledged before signature validation.
#[tokio::test]
async fn test_ping_is_acknowledged_without_signature() {
    let h = harness(SIGNED_HOOKS);

    let response = post_webhook(
        h.router,
        "team-svc",
        &[("x-event-key", "diagnostics:ping")],
        r#"{"test": true}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Webhook configured successfully");
    assert_eq!(h.trigger.call_count().await, 0);
}

/// Verify a hook pinned to Bitbucket rejects a GitHub delivery.
#[tokio::test]
async fn test_provider_mismatch_is_bad_request() {
    let h = harness(SIGNED_HOOKS);
    h.secret_store.insert("team-svc-signing", "s3cret").await;

    let response = post_webhook(
        h.router,
        "team-svc",
        &[("x-github-event", "push")],
        PUSH_PAYLOAD,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.trigger.call_count().await, 0);
}

/// Verify a trigger rejection surfaces as a bad gateway.
#[tokio::test]
async fn test_trigger_rejection_is_bad_gateway() {
    let h = harness(SIGNED_HOOKS);
    h.secret_store.insert("team-svc-signing", "s3cret").await;
    h.trigger
        .fail_with(TriggerError::Rejected {
            job: "svc-build".to_string(),
            status: 500,
            message: "jenkins is down".to_string(),
        })
        .await;

    let signature = sign(PUSH_PAYLOAD.as_bytes(), "s3cret");
    let response = post_webhook(
        h.router,
        "team-svc",
        &[
            ("x-event-key", "repo:refs_changed"),
            ("x-hub-signature-256", &signature),
        ],
        PUSH_PAYLOAD,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

const GITHUB_HOOKS: &str = r#"
hooks:
  gh-app:
    provider: github
    job: app-build
    routes:
      - event: pull_request
        action: opened
        mapping: pr
    mappings:
      pr:
        fields:
          - name: PR_NUMBER
            path: "pull_request.number"
          - name: HEAD_SHA
            path: "pull_request.head.sha"
"#;

/// Verify GitHub action routing matches the configured action only.
#[tokio::test]
async fn test_github_action_routing() {
    let payload = r#"{
      "action": "opened",
      "pull_request": {"number": 42, "head": {"sha": "feedface"}}
    }"#;

    let h = harness(GITHUB_HOOKS);
    let response = post_webhook(
        h.router,
        "gh-app",
        &[("x-github-event", "pull_request")],
        payload,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = h.trigger.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].job, "app-build");
    assert_eq!(calls[0].parameters.get("PR_NUMBER"), Some("42"));
    assert_eq!(calls[0].parameters.get("HEAD_SHA"), Some("feedface"));

    // The same event with a different action does not match.
    let h = harness(GITHUB_HOOKS);
    let closed = r#"{"action": "closed", "pull_request": {"number": 42}}"#;
    let response = post_webhook(
        h.router,
        "gh-app",
        &[("x-github-event", "pull_request")],
        closed,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "ignored");
    assert_eq!(h.trigger.call_count().await, 0);
}

/// Verify a GitHub ping is acknowledged like the Bitbucket diagnostics ping.
#[tokio::test]
async fn test_github_ping_is_acknowledged() {
    let h = harness(GITHUB_HOOKS);
    let response = post_webhook(
        h.router,
        "gh-app",
        &[("x-github-event", "ping")],
        r#"{"zen": "Keep it logically awesome."}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.trigger.call_count().await, 0);
}

/// Verify extracted parameters win over static parameters of the same name.
#[tokio::test]
async fn test_extracted_parameter_wins_over_static() {
    let hooks = r#"
hooks:
  team-svc:
    job: svc-build
    routes:
      - event: "repo:refs_changed"
        mapping: push
    mappings:
      push:
        fields:
          - name: BRANCH
            path: "changes[type=UPDATE].ref.displayId"
    static_parameters:
      - name: BRANCH
        value: fallback
      - name: ENVIRONMENT
        value: staging
"#;

    let h = harness(hooks);
    let response = post_webhook(
        h.router,
        "team-svc",
        &[("x-event-key", "repo:refs_changed")],
        PUSH_PAYLOAD,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let calls = h.trigger.calls().await;
    assert_eq!(calls[0].parameters.get("BRANCH"), Some("main"));
    assert_eq!(calls[0].parameters.get("ENVIRONMENT"), Some("staging"));
}
