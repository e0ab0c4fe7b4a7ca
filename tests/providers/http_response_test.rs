//! Error-body sanitization tests.

use rapport::providers::{sanitize_http_error_body, ProviderError};

#[test]
fn redacts_openrouter_style_tokens() {
    let body = "unauthorized: sk-or-v1-0123456789abcdef0123456789abcdef was rejected";
    let sanitized = sanitize_http_error_body(body);
    assert!(sanitized.contains("[REDACTED]"));
    assert!(!sanitized.contains("sk-or-v1"));
}

#[test]
fn redacts_bearer_headers_echoed_in_bodies() {
    let body = r#"{"error":"bad header Bearer abcdef0123456789"}"#;
    let sanitized = sanitize_http_error_body(body);
    assert!(!sanitized.contains("abcdef0123456789"));
}

#[test]
fn collapses_whitespace_and_truncates() {
    let body = format!("line one\n\n  line   two {}", "x".repeat(500));
    let sanitized = sanitize_http_error_body(&body);
    assert!(sanitized.starts_with("line one line two"));
    assert!(sanitized.ends_with("...[truncated]"));
    assert!(sanitized.chars().count() < 300);
}

#[test]
fn credential_rejection_covers_401_and_403_only() {
    for (status, expected) in [(401, true), (403, true), (429, false), (500, false)] {
        let err = ProviderError::HttpStatus {
            status,
            body: String::new(),
        };
        assert_eq!(err.is_credential_rejection(), expected, "status {status}");
    }
}
