//! Gemini HTTP contract tests
//!
//! These tests run the real HTTP backend against a mock server and check the
//! request shape of each operation and how responses and failures surface.

use base64::{engine::general_purpose, Engine as _};
use muse::genai::prompts::HUMANIZER_SYSTEM_INSTRUCTION;
use muse::genai::{GenAiConfig, GeminiBackend, GenerationClient, Tone};
use muse::messages::ChatMessage;
use muse::MuseError;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GenerationClient {
    let config = GenAiConfig::new("test-key").with_base_url(server.uri());
    GenerationClient::new(Arc::new(GeminiBackend::new(&config)), config)
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    }))
}

#[tokio::test]
async fn test_chat_sends_history_with_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Hello"}]}]
        })))
        .respond_with(text_response("Hi there!"))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .complete_chat(&[ChatMessage::user("Hello")], false)
        .await
        .unwrap();

    assert_eq!(reply, "Hi there!");
}

#[tokio::test]
async fn test_chat_low_latency_uses_fast_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "Hello"}]},
                {"role": "model", "parts": [{"text": "Hi"}]},
                {"role": "user", "parts": [{"text": "Tell me a joke"}]}
            ]
        })))
        .respond_with(text_response("Why did the crab never share?"))
        .expect(1)
        .mount(&server)
        .await;

    let history = vec![
        ChatMessage::user("Hello"),
        ChatMessage::model("Hi"),
        ChatMessage::user("Tell me a joke"),
    ];
    let reply = client_for(&server).complete_chat(&history, true).await.unwrap();
    assert_eq!(reply, "Why did the crab never share?");
}

#[tokio::test]
async fn test_chat_joins_multiple_text_parts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}}]
        })))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .complete_chat(&[ChatMessage::user("Hi")], false)
        .await
        .unwrap();
    assert_eq!(reply, "Hello, world");
}

#[tokio::test]
async fn test_provider_error_becomes_fixed_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete_chat(&[ChatMessage::user("Hello")], false)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to get response from Gemini.");
    match err.root_cause() {
        MuseError::Transport(detail) => assert!(detail.contains("500")),
        other => panic!("unexpected cause {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .complete_chat(&[ChatMessage::user("Hello")], false)
        .await
        .unwrap_err();
    assert!(matches!(err.root_cause(), MuseError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_image_request_and_data_url() {
    let server = MockServer::start().await;
    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    Mock::given(method("POST"))
        .and(path("/v1beta/models/imagen-4.0-generate-001:predict"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "instances": [{"prompt": "a red fox"}],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": "1:1",
                "outputOptions": {"mimeType": "image/jpeg"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{
                "mimeType": "image/jpeg",
                "bytesBase64Encoded": general_purpose::STANDARD.encode(&jpeg)
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = client_for(&server).generate_image("a red fox").await.unwrap();
    assert_eq!(
        url,
        format!("data:image/jpeg;base64,{}", general_purpose::STANDARD.encode(&jpeg))
    );
}

#[tokio::test]
async fn test_image_without_predictions_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/imagen-4.0-generate-001:predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"predictions": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).generate_image("a red fox").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to generate image.");
}

#[tokio::test]
async fn test_speech_request_and_first_audio_part() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "Say cheerfully: Hi there!"}]}],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {"prebuiltVoiceConfig": {"voiceName": "Kore"}}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAABAA=="}},
                {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AgADAA=="}}
            ]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let audio = client_for(&server).synthesize_speech("Hi there!").await.unwrap();
    assert_eq!(audio, "AAABAA==");
}

#[tokio::test]
async fn test_speech_without_audio_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"))
        .respond_with(text_response("I can only talk in text"))
        .mount(&server)
        .await;

    let err = client_for(&server).synthesize_speech("Hi").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to generate speech.");
    assert!(matches!(err.root_cause(), MuseError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_humanize_sends_system_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": HUMANIZER_SYSTEM_INSTRUCTION}]}
        })))
        .respond_with(text_response("We work well together."))
        .expect(1)
        .mount(&server)
        .await;

    let rewritten = client_for(&server)
        .humanize_text("Leverage cross-functional synergies.", Tone::Casual)
        .await
        .unwrap();
    assert_eq!(rewritten, "We work well together.");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Leverage cross-functional synergies."));
    assert!(prompt.contains("Casual"));
    assert_eq!(body["contents"][0]["role"], "user");
}

#[tokio::test]
async fn test_blank_input_never_reaches_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(text_response("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(
        client.generate_image("   ").await,
        Err(MuseError::Validation(_))
    ));
    assert!(matches!(
        client.humanize_text("", Tone::Formal).await,
        Err(MuseError::Validation(_))
    ));
    assert!(matches!(
        client.synthesize_speech("\n").await,
        Err(MuseError::Validation(_))
    ));
    assert!(matches!(
        client.complete_chat(&[], false).await,
        Err(MuseError::Validation(_))
    ));
}
