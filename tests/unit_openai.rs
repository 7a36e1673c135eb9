// OpenAI-compatible client tests against a local wiremock server.

use std::time::Duration;

use serde_json::json;
use theme_mapper::llm::openai::OpenAiGenerator;
use theme_mapper::llm::{ChatMessage, GenerationOptions, TextGenerator};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generator(server: &MockServer) -> OpenAiGenerator {
    OpenAiGenerator::new("sk-test", &server.uri(), "gpt-4", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4",
            "temperature": 0.1,
            "messages": [{"role": "user", "content": "classify these"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"ok\": true}"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = generator(&server)
        .generate(
            &[ChatMessage::user("classify these")],
            &GenerationOptions::with_temperature(0.1),
        )
        .await
        .unwrap();
    assert_eq!(text, "{\"ok\": true}");
}

#[tokio::test]
async fn non_success_status_surfaces_provider_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error": {"message": "Incorrect API key provided"}}"#),
        )
        .mount(&server)
        .await;

    let err = generator(&server)
        .generate(&[ChatMessage::user("test")], &GenerationOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(401));
    assert!(err.message.contains("Incorrect API key provided"));
}

#[tokio::test]
async fn empty_choices_is_a_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = generator(&server)
        .generate(&[ChatMessage::user("test")], &GenerationOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, None);
    assert!(err.message.contains("no content"));
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "hi"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/", server.uri());
    let generator = OpenAiGenerator::new("sk-test", &base, "gpt-4o", Duration::from_secs(5)).unwrap();
    assert_eq!(generator.name(), "openai:gpt-4o");
    assert_eq!(generator.model(), "gpt-4o");
    let text = generator
        .generate(&[ChatMessage::user("test")], &GenerationOptions::default())
        .await
        .unwrap();
    assert_eq!(text, "hi");
}
