use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::Gemini;
use crate::domain::models::ChatPrompt;
use crate::domain::models::ConversationTurn;
use crate::domain::models::Provider;
use crate::domain::models::ProviderName;
use crate::domain::models::ProviderRequest;

impl Gemini {
    fn with_url(url: String) -> Gemini {
        return Gemini {
            url,
            token: "abc".to_string(),
            model: "gemini-2.0-flash".to_string(),
            timeout: "200".to_string(),
        };
    }
}

fn prompt() -> ChatPrompt {
    return ChatPrompt::new(
        vec![ConversationTurn::agent("How do you prioritise repairs?")],
        "By safety impact first.",
        "You are an interviewer.",
    );
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/gemini-2.0-flash?key=abc")
        .with_status(200)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/gemini-2.0-flash?key=abc")
        .with_status(500)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks_without_token() {
    let mut backend = Gemini::with_url("http://localhost:1".to_string());
    backend.token = "".to_string();

    let res = backend.health_check().await;
    assert!(res.is_err());
}

#[tokio::test]
async fn it_gets_completions() -> Result<()> {
    let body = json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "text": "Good answer. " }, { "text": "Next question." }]
            },
            "finishReason": "STOP"
        }]
    });

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent?key=abc")
        .match_body(Matcher::Json(json!({
            "systemInstruction": { "parts": [{ "text": "You are an interviewer." }] },
            "contents": [
                { "role": "model", "parts": [{ "text": "How do you prioritise repairs?" }] },
                { "role": "user", "parts": [{ "text": "By safety impact first." }] }
            ]
        })))
        .with_status(200)
        .with_body(body.to_string())
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend
        .complete(&ProviderRequest::build(&prompt(), ProviderName::Gemini))
        .await?;

    mock.assert();
    assert_eq!(res, "Good answer. Next question.");

    return Ok(());
}

#[tokio::test]
async fn it_fails_completions_on_error_status() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent?key=abc")
        .with_status(429)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend
        .complete(&ProviderRequest::build(&prompt(), ProviderName::Gemini))
        .await;

    mock.assert();
    insta::assert_snapshot!(res.unwrap_err().to_string(), @"Failed to make completion request to Gemini, 429");
}

#[tokio::test]
async fn it_fails_completions_without_candidates() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent?key=abc")
        .with_status(200)
        .with_body("{\"candidates\": []}")
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend
        .complete(&ProviderRequest::build(&prompt(), ProviderName::Gemini))
        .await;

    mock.assert();
    assert!(res.is_err());
}

#[tokio::test]
async fn it_rejects_secondary_requests() {
    let backend = Gemini::with_url("http://localhost:1".to_string());
    let res = backend
        .complete(&ProviderRequest::build(&prompt(), ProviderName::OpenRouter))
        .await;

    insta::assert_snapshot!(res.unwrap_err().to_string(), @"Gemini cannot send a request shaped for openrouter");
}
