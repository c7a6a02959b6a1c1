//! Tests for build handle serialization.

use super::*;

/// Verify an absent build URL is omitted from the wire form.
#[test]
fn test_handle_omits_absent_url() {
    let handle = BuildHandle {
        build_id: "42".to_string(),
        build_url: None,
    };
    let rendered = serde_json::to_string(&handle).unwrap();
    assert_eq!(rendered, r#"{"build_id":"42"}"#);
}

/// Verify a handle round-trips with a URL present.
#[test]
fn test_handle_round_trip_with_url() {
    let json = r#"{"build_id":"42","build_url":"https://ci.example.com/builds/42"}"#;
    let handle: BuildHandle = serde_json::from_str(json).unwrap();
    assert_eq!(handle.build_id, "42");
    assert_eq!(
        handle.build_url.as_deref(),
        Some("https://ci.example.com/builds/42")
    );
}

/// Verify rejection errors render the job and status for logs.
#[test]
fn test_rejected_error_display() {
    let err = TriggerError::Rejected {
        job: "svc-build".to_string(),
        status: 403,
        message: "quota exceeded".to_string(),
    };
    let rendered = err.to_string();
    assert!(rendered.contains("svc-build"));
    assert!(rendered.contains("403"));
}
