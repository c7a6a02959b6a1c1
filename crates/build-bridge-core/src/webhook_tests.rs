//! Tests for provider detection and webhook request parsing.

use super::*;
use serde_json::json;
use std::collections::HashMap;

fn lookup_in<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<&'a str> + 'a {
    move |name| map.get(name).copied()
}

// ============================================================================
// Header detection tests
// ============================================================================

mod headers {
    use super::*;

    /// Verify the Bitbucket event header selects the Bitbucket provider.
    #[test]
    fn test_bitbucket_detection() {
        let map = HashMap::from([
            ("x-event-key", "repo:refs_changed"),
            ("x-request-id", "d-123"),
        ]);
        let headers = WebhookHeaders::from_lookup(lookup_in(&map)).unwrap();

        assert_eq!(headers.provider, ProviderKind::Bitbucket);
        assert_eq!(headers.event_key, "repo:refs_changed");
        assert_eq!(headers.delivery_id.as_deref(), Some("d-123"));
        assert_eq!(headers.signature, None);
    }

    /// Verify the GitHub event header selects the GitHub provider.
    #[test]
    fn test_github_detection() {
        let map = HashMap::from([
            ("x-github-event", "push"),
            ("x-github-delivery", "gh-456"),
            ("x-hub-signature-256", "sha256=abcd"),
        ]);
        let headers = WebhookHeaders::from_lookup(lookup_in(&map)).unwrap();

        assert_eq!(headers.provider, ProviderKind::Github);
        assert_eq!(headers.signature.as_deref(), Some("sha256=abcd"));
        assert_eq!(headers.delivery_id.as_deref(), Some("gh-456"));
    }

    /// Verify the modern signature header wins over the legacy one.
    #[test]
    fn test_signature_header_precedence() {
        let map = HashMap::from([
            ("x-github-event", "push"),
            ("x-hub-signature", "sha1=old"),
            ("x-hub-signature-256", "sha256=new"),
        ]);
        let headers = WebhookHeaders::from_lookup(lookup_in(&map)).unwrap();
        assert_eq!(headers.signature.as_deref(), Some("sha256=new"));
    }

    /// Verify requests without a provider header are rejected.
    #[test]
    fn test_missing_provider_header_rejected() {
        let map = HashMap::from([("content-type", "application/json")]);
        let result = WebhookHeaders::from_lookup(lookup_in(&map));
        assert_eq!(result, Err(WebhookError::UnknownProvider));
    }

    /// Verify ping detection per provider.
    #[test]
    fn test_ping_detection() {
        let bitbucket = HashMap::from([("x-event-key", "diagnostics:ping")]);
        assert!(WebhookHeaders::from_lookup(lookup_in(&bitbucket))
            .unwrap()
            .is_ping());

        let github = HashMap::from([("x-github-event", "ping")]);
        assert!(WebhookHeaders::from_lookup(lookup_in(&github))
            .unwrap()
            .is_ping());

        let push = HashMap::from([("x-github-event", "push")]);
        assert!(!WebhookHeaders::from_lookup(lookup_in(&push))
            .unwrap()
            .is_ping());
    }
}

// ============================================================================
// Request payload tests
// ============================================================================

mod request {
    use super::*;

    fn bitbucket_headers() -> WebhookHeaders {
        WebhookHeaders {
            provider: ProviderKind::Bitbucket,
            event_key: "repo:refs_changed".to_string(),
            signature: None,
            delivery_id: None,
        }
    }

    /// Verify a JSON object body parses.
    #[test]
    fn test_parse_object_payload() {
        let request = WebhookRequest::new(
            bitbucket_headers(),
            Bytes::from_static(br#"{"eventKey":"repo:refs_changed"}"#),
        );
        let payload = request.parse_payload().unwrap();
        assert_eq!(payload["eventKey"], "repo:refs_changed");
    }

    /// Verify invalid JSON is reported as malformed.
    #[test]
    fn test_invalid_json_is_malformed() {
        let request = WebhookRequest::new(bitbucket_headers(), Bytes::from_static(b"{not json"));
        assert!(matches!(
            request.parse_payload(),
            Err(WebhookError::MalformedPayload { .. })
        ));
    }

    /// Verify a non-object root is reported as malformed.
    #[test]
    fn test_non_object_root_is_malformed() {
        let request = WebhookRequest::new(bitbucket_headers(), Bytes::from_static(b"[1,2,3]"));
        assert!(matches!(
            request.parse_payload(),
            Err(WebhookError::MalformedPayload { .. })
        ));
    }

    /// Verify action extraction is GitHub-only.
    #[test]
    fn test_action_extraction_per_provider() {
        let payload = json!({"action": "opened"});
        assert_eq!(ProviderKind::Github.action_of(&payload), Some("opened"));
        assert_eq!(ProviderKind::Bitbucket.action_of(&payload), None);
    }
}
