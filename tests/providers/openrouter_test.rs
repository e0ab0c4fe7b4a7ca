//! OpenRouter wire format tests.

use serde_json::json;

use rapport::providers::openrouter::{build_request, parse_response};
use rapport::providers::{CompletionRequest, Message, ProviderError};

fn simple_request() -> CompletionRequest {
    CompletionRequest {
        system: "You are helpful.".to_owned(),
        messages: vec![Message::user("Hello")],
    }
}

#[test]
fn build_request_puts_system_first_and_maps_roles() {
    let req = build_request("openai/gpt-3.5-turbo", &simple_request());
    assert_eq!(req.model, "openai/gpt-3.5-turbo");
    assert_eq!(req.messages.len(), 2);
    assert_eq!(req.messages[0].role, "system");
    assert_eq!(req.messages[0].content, "You are helpful.");
    assert_eq!(req.messages[1].role, "user");
    assert_eq!(req.messages[1].content, "Hello");
}

#[test]
fn build_request_applies_fixed_sampling_parameters() {
    let req = build_request("openai/gpt-3.5-turbo", &simple_request());
    assert_eq!(req.max_tokens, 500);
    let encoded = serde_json::to_value(&req).expect("serializable");
    assert_eq!(encoded["temperature"], serde_json::json!(0.8));
    assert_eq!(encoded["top_p"], serde_json::json!(0.9));
    assert_eq!(encoded["frequency_penalty"], serde_json::json!(0.1));
    assert_eq!(encoded["presence_penalty"], serde_json::json!(0.1));
}

#[test]
fn build_request_preserves_history_order() {
    let request = CompletionRequest {
        system: "s".to_owned(),
        messages: vec![
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
        ],
    };
    let req = build_request("m", &request);
    let roles: Vec<&str> = req.messages.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, ["system", "user", "assistant", "user"]);
}

#[test]
fn request_serializes_expected_field_names() {
    let encoded =
        serde_json::to_value(build_request("m", &simple_request())).expect("serializable");
    for field in [
        "model",
        "messages",
        "max_tokens",
        "temperature",
        "top_p",
        "frequency_penalty",
        "presence_penalty",
    ] {
        assert!(encoded.get(field).is_some(), "missing field {field}");
    }
}

#[test]
fn parse_response_extracts_and_trims_reply() {
    let body = json!({
        "choices": [{"message": {"role": "assistant", "content": "  Hello there.  "}}]
    });
    let reply = parse_response(&body.to_string()).expect("valid body parses");
    assert_eq!(reply, "Hello there.");
}

#[test]
fn parse_response_rejects_missing_choices() {
    let body = json!({"choices": []});
    let err = parse_response(&body.to_string()).expect_err("empty choices must fail");
    assert!(matches!(err, ProviderError::Parse(_)));
    assert!(err.to_string().contains("choices[0]"));
}

#[test]
fn parse_response_rejects_missing_content() {
    let body = json!({"choices": [{"message": {"role": "assistant"}}]});
    let err = parse_response(&body.to_string()).expect_err("missing content must fail");
    assert!(matches!(err, ProviderError::Parse(_)));
}

#[test]
fn parse_response_rejects_invalid_json() {
    let err = parse_response("{nope").expect_err("garbage must fail");
    assert!(matches!(err, ProviderError::Parse(_)));
}
