use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ai_client::{AiError, HuggingFace};

const MODEL: &str = "google/gemma-3-27b-it";
const IMAGE_URL: &str = "https://storage.googleapis.com/waste-management-photos/can.jpg";

fn router(server: &MockServer) -> HuggingFace {
    HuggingFace::new("hf-test-token", MODEL)
        .with_provider("nebius")
        .with_base_url(format!("{}/v1", server.uri()))
        .with_timeout(Duration::from_secs(5))
}

fn reply(content: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

#[tokio::test]
async fn completion_returns_first_choice_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer hf-test-token"))
        .and(body_partial_json(json!({
            "model": "google/gemma-3-27b-it:nebius",
            "max_tokens": 500
        })))
        .respond_with(reply(json!("Recyclable")))
        .expect(1)
        .mount(&server)
        .await;

    let text = router(&server)
        .complete_with_image("What type of waste is this?", IMAGE_URL, 500)
        .await
        .unwrap();

    assert_eq!(text, "Recyclable");
}

#[tokio::test]
async fn image_reference_is_sent_as_url_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "Classify."},
                    {"type": "image_url", "image_url": {"url": IMAGE_URL}}
                ]
            }]
        })))
        .respond_with(reply(json!("ok")))
        .expect(1)
        .mount(&server)
        .await;

    router(&server)
        .complete_with_image("Classify.", IMAGE_URL, 10)
        .await
        .unwrap();
}

#[tokio::test]
async fn provider_error_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model is loading"))
        .mount(&server)
        .await;

    let err = router(&server)
        .complete_with_image("Classify.", IMAGE_URL, 10)
        .await
        .unwrap_err();

    match err {
        AiError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "model is loading");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn no_choices_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = router(&server)
        .complete_with_image("Classify.", IMAGE_URL, 10)
        .await
        .unwrap_err();

    assert!(matches!(err, AiError::EmptyResponse(_)));
}

#[tokio::test]
async fn blank_or_null_content_is_empty_response() {
    for content in [json!(""), Value::Null] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply(content.clone()))
            .mount(&server)
            .await;

        let err = router(&server)
            .complete_with_image("Classify.", IMAGE_URL, 10)
            .await
            .unwrap_err();

        assert!(
            matches!(err, AiError::EmptyResponse(_)),
            "content {content} gave {err:?}"
        );
    }
}
