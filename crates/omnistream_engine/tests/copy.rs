use omnistream_core::Platform;
use omnistream_engine::{CopyError, CopyGenerator, CopySettings, GeminiCopyGenerator, HttpSettings};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generator(server: &MockServer) -> GeminiCopyGenerator {
    GeminiCopyGenerator::new(
        server.uri(),
        "test-key",
        CopySettings::default(),
        &HttpSettings::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn generates_metadata_from_structured_response() {
    let server = MockServer::start().await;
    let copy = json!({
        "title": "三分钟学会 Rust",
        "description": "零基础入门",
        "tags": ["rust", "编程", "rust"]
    });
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": copy.to_string() }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = generator(&server)
        .generate("rust basics", Platform::Bilibili)
        .await
        .unwrap();

    assert_eq!(metadata.title, "三分钟学会 Rust");
    assert_eq!(metadata.tags, vec!["rust", "编程", "rust"]);
}

#[tokio::test]
async fn empty_candidates_are_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = generator(&server)
        .generate("anything", Platform::X)
        .await
        .unwrap_err();
    assert!(matches!(err, CopyError::EmptyResponse));
}

#[tokio::test]
async fn service_errors_carry_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let err = generator(&server)
        .generate("anything", Platform::TikTok)
        .await
        .unwrap_err();
    match err {
        CopyError::Http { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "API key not valid");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn malformed_copy_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"title\": 3}" }] } }]
        })))
        .mount(&server)
        .await;

    let err = generator(&server)
        .generate("anything", Platform::YouTube)
        .await
        .unwrap_err();
    assert!(matches!(err, CopyError::InvalidCopy(_)));
}
