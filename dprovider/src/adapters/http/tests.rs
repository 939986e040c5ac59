#![cfg(test)]

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::{AgentEngineResource, ProviderErrorKind};

use super::HttpBackendTransport;
use super::serde_api::{extract_error_details, parse_reply};
use super::transport::{error_for_status, is_event_stream};

#[test]
fn status_mapping_keeps_status_and_backend_code() {
    let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
    let error = error_for_status(StatusCode::TOO_MANY_REQUESTS, body);

    assert_eq!(error.kind, ProviderErrorKind::RateLimited);
    assert_eq!(error.status, Some(429));
    assert_eq!(error.code.as_deref(), Some("RESOURCE_EXHAUSTED"));
    assert_eq!(error.message, "Quota exceeded");
    assert!(error.is_transient());
}

#[test]
fn status_mapping_covers_auth_invalid_and_unavailable() {
    assert_eq!(
        error_for_status(StatusCode::FORBIDDEN, "").kind,
        ProviderErrorKind::Authentication
    );
    assert_eq!(
        error_for_status(StatusCode::PAYLOAD_TOO_LARGE, "").kind,
        ProviderErrorKind::InvalidRequest
    );
    assert_eq!(
        error_for_status(StatusCode::GATEWAY_TIMEOUT, "").kind,
        ProviderErrorKind::Timeout
    );
    assert_eq!(
        error_for_status(StatusCode::BAD_GATEWAY, "").kind,
        ProviderErrorKind::Unavailable
    );
    assert_eq!(
        error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "oops").kind,
        ProviderErrorKind::Transport
    );
}

#[test]
fn unparseable_error_body_falls_back_to_status_message() {
    let error = error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>");
    assert!(error.message.contains("500"));
    assert!(error.code.is_none());
}

#[test]
fn plain_string_error_body_is_used_as_message() {
    let details = extract_error_details(r#"{"error":"Authentication required"}"#);
    assert_eq!(details.message.as_deref(), Some("Authentication required"));
    assert!(details.code.is_none());
}

#[test]
fn event_stream_detection_ignores_parameters_and_case() {
    let mut headers = HeaderMap::new();
    assert!(!is_event_stream(&headers));

    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("Text/Event-Stream; charset=utf-8"),
    );
    assert!(is_event_stream(&headers));

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    assert!(!is_event_stream(&headers));
}

#[test]
fn reply_parsing_accepts_bare_and_wrapped_objects() {
    let bare = parse_reply(br#"{"response":"hi","metadata":{"model":"m","processingTime":12.5,"sessionId":"s"}}"#)
        .expect("bare reply should parse");
    assert_eq!(bare.response, "hi");
    assert_eq!(bare.metadata.map(|metadata| metadata.session_id), Some("s".to_string()));

    let wrapped = parse_reply(br#"{"result":{"response":"wrapped"}}"#)
        .expect("wrapped reply should parse");
    assert_eq!(wrapped.response, "wrapped");
    assert!(wrapped.metadata.is_none());
}

#[test]
fn reply_parsing_rejects_garbage_as_decode_error() {
    let error = parse_reply(b"not json").expect_err("garbage should fail");
    assert_eq!(error.kind, ProviderErrorKind::Decode);
}

#[test]
fn transport_for_engine_validates_resource() {
    let client = reqwest::Client::new();
    let resource = AgentEngineResource::new("proj", "us-central1", "123");
    let transport = HttpBackendTransport::for_engine(client.clone(), &resource, None)
        .expect("valid resource");
    assert!(transport.endpoint().ends_with("reasoningEngines/123:streamQuery"));

    let bad = AgentEngineResource::new("proj", "us-central1", "");
    assert!(HttpBackendTransport::for_engine(client, &bad, None).is_err());
}
