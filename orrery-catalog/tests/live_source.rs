//! LiveSource against a local HTTP server.

use std::sync::Arc;

use orrery_catalog::auth::MemoryCredentialStore;
use orrery_catalog::registry::{ANTHROPIC, GEMINI, OPENAI, ProviderProfile};
use orrery_catalog::sources::{CatalogSource, LiveSource};
use orrery_catalog::SourceError;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(profile: ProviderProfile, server: &MockServer, key: &str) -> LiveSource {
    let store = Arc::new(MemoryCredentialStore::with_key(profile.id, key));
    LiveSource::new(profile, store).with_base_url(server.uri())
}

#[tokio::test]
async fn openai_sends_bearer_and_decodes_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"id": "gpt-4o", "object": "model", "created": 1715367049, "owned_by": "system"},
                {"id": "text-embedding-3-small", "object": "model", "created": 1705948997, "owned_by": "system"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = source(OPENAI, &server, "sk-test").fetch().await.unwrap();

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].id, "gpt-4o");
    assert_eq!(models[0].created, Some(1715367049));
    assert_eq!(models[1].owned_by.as_deref(), Some("system"));
}

#[tokio::test]
async fn anthropic_sends_key_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("x-api-key", "sk-ant"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "type": "model",
                "id": "claude-sonnet-4-5-20250929",
                "display_name": "Claude Sonnet 4.5",
                "created_at": "2025-09-29T00:00:00Z"
            }],
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = source(ANTHROPIC, &server, "sk-ant").fetch().await.unwrap();

    assert_eq!(models.len(), 1);
    assert_eq!(models[0].display_name.as_deref(), Some("Claude Sonnet 4.5"));
    assert_eq!(models[0].created, Some(1759104000));
}

#[tokio::test]
async fn gemini_sends_goog_header_and_strips_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(header("x-goog-api-key", "AIza-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{
                "name": "models/gemini-2.5-flash",
                "displayName": "Gemini 2.5 Flash",
                "supportedGenerationMethods": ["generateContent", "countTokens"]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = source(GEMINI, &server, "AIza-test").fetch().await.unwrap();

    assert_eq!(models[0].id, "gemini-2.5-flash");
    assert_eq!(models[0].methods, vec!["generateContent", "countTokens"]);
}

#[tokio::test]
async fn rejected_credential_maps_to_missing_credential() {
    for status in [401, 403] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let result = source(OPENAI, &server, "sk-revoked").fetch().await;
        assert_eq!(result, Err(SourceError::MissingCredential), "status {status}");
    }
}

#[tokio::test]
async fn server_error_maps_to_request_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = source(OPENAI, &server, "sk-test").fetch().await;
    assert_eq!(result, Err(SourceError::RequestFailed(500)));
}

#[tokio::test]
async fn malformed_body_maps_to_decoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = source(OPENAI, &server, "sk-test").fetch().await;
    assert!(matches!(result, Err(SourceError::Decoding(_))), "{result:?}");
}

#[tokio::test]
async fn blank_credential_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let result = source(OPENAI, &server, "   ").fetch().await;
    assert_eq!(result, Err(SourceError::MissingCredential));
}

#[tokio::test]
async fn unreachable_server_maps_to_network() {
    let store = Arc::new(MemoryCredentialStore::with_key("openai", "sk-test"));
    let source = LiveSource::new(OPENAI, store).with_base_url("http://127.0.0.1:1");

    let result = source.fetch().await;
    assert!(matches!(result, Err(SourceError::Network(_))), "{result:?}");
}
