//! Integration tests for the model collaborators using a wiremock server

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use providers::{ChatBackend, DiffusionClient, ImageBackend, OllamaClient, ProviderStatus};
use serde_json::json;
use shared::agent_api::ChatMessage;
use shared::settings::ImageSettings;
use std::io::Cursor;
use std::time::{Duration, Instant};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn png_base64(width: u32, height: u32) -> String {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::new_rgba8(width, height)
        .write_to(&mut bytes, ImageOutputFormat::Png)
        .unwrap();
    BASE64.encode(bytes.into_inner())
}

#[tokio::test]
async fn test_ollama_chat_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "Vedu/QRX3_chatbot",
            "stream": false,
            "messages": [
                {"role": "system", "content": "context"},
                {"role": "user", "content": "hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "Vedu/QRX3_chatbot",
            "message": {"role": "assistant", "content": "Hi there"},
            "done": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OllamaClient::new(&mock_server.uri(), "Vedu/QRX3_chatbot", None).unwrap();
    let reply = client
        .chat(vec![ChatMessage::system("context"), ChatMessage::user("hello")])
        .await
        .unwrap();

    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn test_ollama_chat_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&mock_server)
        .await;

    let client = OllamaClient::new(&mock_server.uri(), "missing", None).unwrap();
    let err = client
        .chat(vec![ChatMessage::user("hello")])
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(text.contains("404"));
    assert!(text.contains("model not found"));
}

#[tokio::test]
async fn test_ollama_health_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&mock_server)
        .await;

    let client = OllamaClient::new(&mock_server.uri(), "m", None).unwrap();
    assert_eq!(client.health_check().await, ProviderStatus::Available);

    let unreachable = OllamaClient::new("http://127.0.0.1:1", "m", None).unwrap();
    assert!(matches!(
        unreachable.health_check().await,
        ProviderStatus::Unavailable { .. }
    ));
}

#[tokio::test]
async fn test_ollama_health_check_gives_up_on_stalled_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"models": []}))
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&mock_server)
        .await;

    // no request timeout on the chat client itself
    let client = OllamaClient::new(&mock_server.uri(), "m", None).unwrap();
    let started = Instant::now();
    let status = client.health_check().await;

    assert!(matches!(status, ProviderStatus::Unavailable { .. }));
    assert!(started.elapsed() < Duration::from_secs(15));
}

#[tokio::test]
async fn test_diffusion_decodes_first_image() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sdapi/v1/txt2img"))
        .and(body_partial_json(json!({"prompt": "a red fox", "steps": 20})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images": [png_base64(4, 3), png_base64(1, 1)],
            "parameters": {}
        })))
        .mount(&mock_server)
        .await;

    let client = DiffusionClient::new(&ImageSettings {
        base_url: mock_server.uri(),
        steps: 20,
        ..ImageSettings::default()
    })
    .unwrap();
    let image = client.generate("a red fox").await.unwrap();

    assert_eq!(image.dimensions(), (4, 3));
}

#[tokio::test]
async fn test_diffusion_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sdapi/v1/txt2img"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"images": []})))
        .mount(&mock_server)
        .await;

    let client = DiffusionClient::new(&ImageSettings {
        base_url: mock_server.uri(),
        ..ImageSettings::default()
    })
    .unwrap();
    let err = client.generate("anything").await.unwrap_err();

    assert!(err.to_string().contains("no images"));
}
