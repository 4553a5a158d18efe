/*!
 * Provider clients against local stub servers
 */

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use codeconv::errors::ProviderError;
use codeconv::providers::anthropic::Anthropic;
use codeconv::providers::ollama::Ollama;
use codeconv::providers::openai::OpenAI;
use codeconv::providers::CodeModel;

use crate::common;

#[tokio::test]
async fn test_ollama_generate_shouldPostToApiGenerate() {
    let router = Router::new().route(
        "/api/generate",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["model"], "codellama");
            assert_eq!(body["stream"], false);
            assert_eq!(body["system"], "be terse");
            Json(json!({
                "model": "codellama",
                "response": "print('hi')\n",
                "done": true
            }))
        }),
    );
    let base = common::spawn_stub_server(router).await;

    let client = Ollama::new(base, 5, 0.2, 256);
    let text = client.generate("codellama", "be terse", "convert me").await.unwrap();

    assert_eq!(text, "print('hi')\n");
    assert_eq!(client.name(), "ollama");
}

#[tokio::test]
async fn test_openai_generate_shouldSendBearerTokenAndReadFirstChoice() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["authorization"], "Bearer sk-test");
            assert_eq!(body["messages"][0]["role"], "system");
            assert_eq!(body["messages"][1]["content"], "convert me");
            Json(json!({
                "choices": [{"message": {"role": "assistant", "content": "console.log(1);"}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5}
            }))
        }),
    );
    let base = common::spawn_stub_server(router).await;

    let client = OpenAI::new(format!("{}/v1", base), "sk-test", 5, 0.2, 256);
    let text = client.generate("gpt-4o-mini", "system prompt", "convert me").await.unwrap();

    assert_eq!(text, "console.log(1);");
}

#[tokio::test]
async fn test_anthropic_generate_shouldSendApiKeyHeader() {
    let router = Router::new().route(
        "/v1/messages",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["x-api-key"], "ak-test");
            assert!(headers.contains_key("anthropic-version"));
            assert_eq!(body["system"], "system prompt");
            Json(json!({
                "content": [
                    {"type": "text", "text": "public class A {}"}
                ],
                "usage": {"input_tokens": 12, "output_tokens": 4}
            }))
        }),
    );
    let base = common::spawn_stub_server(router).await;

    let client = Anthropic::new(base, "ak-test", 5, 0.2, 256);
    let text = client.generate("claude-3-5-haiku-latest", "system prompt", "convert me").await.unwrap();

    assert_eq!(text, "public class A {}");
}

#[tokio::test]
async fn test_openai_withUnauthorized_shouldReturnAuthenticationError() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
    );
    let base = common::spawn_stub_server(router).await;

    let client = OpenAI::new(format!("{}/v1", base), "bad", 5, 0.2, 256);
    let err = client.generate("gpt-4o-mini", "s", "p").await.unwrap_err();

    assert!(matches!(err, ProviderError::AuthenticationError(ref m) if m.contains("invalid api key")));
}

#[tokio::test]
async fn test_ollama_withServerError_shouldReturnApiError() {
    let router = Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );
    let base = common::spawn_stub_server(router).await;

    let client = Ollama::new(base, 5, 0.2, 256);
    let err = client.generate("codellama", "s", "p").await.unwrap_err();

    assert!(matches!(err, ProviderError::ApiError { status_code: 500, .. }));
}

#[tokio::test]
async fn test_anthropic_withRateLimit_shouldReturnRateLimitExceeded() {
    let router = Router::new().route(
        "/v1/messages",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );
    let base = common::spawn_stub_server(router).await;

    let client = Anthropic::new(base, "ak", 5, 0.2, 256);
    let err = client.generate("m", "s", "p").await.unwrap_err();

    assert!(matches!(err, ProviderError::RateLimitExceeded(_)));
}

#[tokio::test]
async fn test_ollama_withUnreachableServer_shouldReturnConnectionError() {
    // Bind and drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = Ollama::new(format!("http://127.0.0.1:{}", port), 2, 0.2, 256);
    let err = client.generate("codellama", "s", "p").await.unwrap_err();

    assert!(matches!(err, ProviderError::ConnectionError(_)));
}
