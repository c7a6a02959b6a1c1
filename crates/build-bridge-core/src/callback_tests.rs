//! Tests for template rendering and callback delivery.

use super::*;
use crate::adapters::InMemorySecretStore;
use crate::hook_config::CallbackAuth;
use crate::secrets::SecretName;
use wiremock::matchers::{body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn values(pairs: &[(&str, &str)]) -> ExtractedParameters {
    pairs
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Template rendering tests
// ============================================================================

mod rendering {
    use super::*;

    /// Verify placeholders substitute from the parameter set.
    #[test]
    fn test_placeholders_substitute() {
        let rendered = render_template(
            "https://git.example.com/builds/{{LATEST_COMMIT_HASH}}",
            &values(&[("LATEST_COMMIT_HASH", "abc123")]),
        );
        assert_eq!(rendered, "https://git.example.com/builds/abc123");
    }

    /// Verify multiple occurrences of one placeholder all substitute.
    #[test]
    fn test_repeated_placeholder() {
        let rendered = render_template(
            "{{BUILD_ID}}/{{BUILD_ID}}",
            &values(&[("BUILD_ID", "7")]),
        );
        assert_eq!(rendered, "7/7");
    }

    /// Verify unresolved placeholders are left verbatim.
    #[test]
    fn test_unresolved_placeholder_left_verbatim() {
        let rendered = render_template(
            r#"{"state": "{{BUILD_STATUS}}", "key": "{{MISSING}}"}"#,
            &values(&[("BUILD_STATUS", "INPROGRESS")]),
        );
        assert_eq!(rendered, r#"{"state": "INPROGRESS", "key": "{{MISSING}}"}"#);
    }

    /// Verify text without placeholders passes through untouched.
    #[test]
    fn test_plain_text_untouched() {
        let rendered = render_template("no placeholders here", &values(&[]));
        assert_eq!(rendered, "no placeholders here");
    }

    /// Verify single braces are not treated as placeholders.
    #[test]
    fn test_single_braces_ignored() {
        let rendered = render_template("{BUILD_ID}", &values(&[("BUILD_ID", "7")]));
        assert_eq!(rendered, "{BUILD_ID}");
    }
}

// ============================================================================
// Delivery tests
// ============================================================================

mod delivery {
    use super::*;

    /// Verify a rendered callback is posted with basic auth.
    #[tokio::test]
    async fn test_callback_posts_rendered_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/build-status/commits/abc123"))
            .and(header_exists("authorization"))
            .and(body_string_contains("INPROGRESS"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let secrets = InMemorySecretStore::new();
        secrets.insert("cb-user", "bridge").await;
        secrets.insert("cb-pass", "token").await;

        let config = CallbackConfig {
            url: format!(
                "{}/rest/build-status/commits/{{{{LATEST_COMMIT_HASH}}}}",
                server.uri()
            ),
            body: r#"{"state": "{{BUILD_STATUS}}", "key": "{{BUILD_ID}}"}"#.to_string(),
            auth: Some(CallbackAuth {
                username_secret: SecretName::new("cb-user").unwrap(),
                password_secret: SecretName::new("cb-pass").unwrap(),
            }),
        };

        let sender = StatusCallbackSender::new();
        let result = sender
            .send(
                &config,
                &values(&[
                    ("LATEST_COMMIT_HASH", "abc123"),
                    ("BUILD_STATUS", "INPROGRESS"),
                    ("BUILD_ID", "42"),
                ]),
                &secrets,
            )
            .await;
        assert!(result.is_ok());
    }

    /// Verify a non-success receiver status is reported as rejected.
    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let config = CallbackConfig {
            url: format!("{}/status", server.uri()),
            body: "{}".to_string(),
            auth: None,
        };

        let sender = StatusCallbackSender::new();
        let result = sender
            .send(&config, &values(&[]), &InMemorySecretStore::new())
            .await;
        assert!(matches!(result, Err(CallbackError::Rejected { status: 502 })));
    }

    /// Verify a missing credential secret fails the send.
    #[tokio::test]
    async fn test_missing_credential_secret_fails() {
        let config = CallbackConfig {
            url: "https://git.example.com/status".to_string(),
            body: "{}".to_string(),
            auth: Some(CallbackAuth {
                username_secret: SecretName::new("absent").unwrap(),
                password_secret: SecretName::new("absent").unwrap(),
            }),
        };

        let sender = StatusCallbackSender::new();
        let result = sender
            .send(&config, &values(&[]), &InMemorySecretStore::new())
            .await;
        assert!(matches!(result, Err(CallbackError::Secrets(_))));
    }

    /// Verify an unparseable rendered URL is rejected before any request.
    #[tokio::test]
    async fn test_invalid_rendered_url_rejected() {
        let config = CallbackConfig {
            url: "not a url".to_string(),
            body: "{}".to_string(),
            auth: None,
        };

        let sender = StatusCallbackSender::new();
        let result = sender
            .send(&config, &values(&[]), &InMemorySecretStore::new())
            .await;
        assert!(matches!(result, Err(CallbackError::InvalidUrl { .. })));
    }
}
