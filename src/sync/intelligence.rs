use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Outcome of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response_text: String,
    /// Task the service pulled out of the message, if any.
    pub extracted_todo: Option<String>,
    pub label: Option<String>,
}

/// The remote service that answers chat turns and labels to-do text.
pub trait TaskIntelligence: Send + Sync {
    fn chat<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<ChatReply>>;

    fn label<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<String>>;
}

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    chat: ChatTurn<'a>,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: ChatContent,
    #[serde(default)]
    todo: String,
    #[serde(default)]
    label: String,
}

#[derive(Debug, Serialize)]
struct LabelRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    label: String,
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

/// Decode a `/chat` response body. An empty `todo` means nothing was extracted.
pub fn parse_chat_reply(body: &str) -> Result<ChatReply> {
    let resp: ChatResponse = serde_json::from_str(body)?;
    Ok(ChatReply {
        response_text: resp.response.content,
        extracted_todo: non_empty(resp.todo),
        label: non_empty(resp.label),
    })
}

/// Decode a `/label` response body.
pub fn parse_label(body: &str) -> Result<String> {
    let resp: LabelResponse = serde_json::from_str(body)?;
    Ok(resp.label)
}

/// JSON-over-HTTP client for the chat and label endpoints.
pub struct HttpIntelligence {
    base_url: String,
    http: Client,
}

impl HttpIntelligence {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::from_response(&url, resp).await);
        }
        Ok(resp.text().await?)
    }

    pub async fn send_chat(&self, message: &str) -> Result<ChatReply> {
        let body = ChatRequest {
            chat: ChatTurn {
                role: "user",
                content: message,
            },
        };
        let text = self.post("chat", &body).await?;
        log::debug!("Chat response: {}", text);
        parse_chat_reply(&text)
    }

    pub async fn label_todo(&self, text: &str) -> Result<String> {
        let raw = self.post("label", &LabelRequest { text }).await?;
        log::debug!("Label response: {}", raw);
        parse_label(&raw)
    }
}

impl TaskIntelligence for HttpIntelligence {
    fn chat<'a>(&'a self, message: &'a str) -> BoxFuture<'a, Result<ChatReply>> {
        Box::pin(self.send_chat(message))
    }

    fn label<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.label_todo(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_shape() {
        let body = ChatRequest {
            chat: ChatTurn {
                role: "user",
                content: "add milk to list",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "chat": { "role": "user", "content": "add milk to list" } })
        );
    }

    #[test]
    fn label_request_shape() {
        let json = serde_json::to_value(LabelRequest { text: "call mom" }).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "call mom" }));
    }

    #[test]
    fn chat_reply_with_task() {
        let reply = parse_chat_reply(
            r#"{"response":{"content":"Sure!"},"todo":"buy milk","label":"home"}"#,
        )
        .unwrap();
        assert_eq!(reply.response_text, "Sure!");
        assert_eq!(reply.extracted_todo.as_deref(), Some("buy milk"));
        assert_eq!(reply.label.as_deref(), Some("home"));
    }

    #[test]
    fn empty_todo_means_no_task() {
        let reply =
            parse_chat_reply(r#"{"response":{"content":"That sounds hard."},"todo":"","label":""}"#)
                .unwrap();
        assert_eq!(reply.extracted_todo, None);
        assert_eq!(reply.label, None);
    }

    #[test]
    fn malformed_chat_is_an_error() {
        assert!(matches!(parse_chat_reply(r#"{"todo":"x"}"#), Err(Error::Decode(_))));
        assert!(parse_chat_reply("<html>").is_err());
    }

    #[test]
    fn label_body() {
        assert_eq!(parse_label(r#"{"label":"personal"}"#).unwrap(), "personal");
        assert!(parse_label(r#"{}"#).is_err());
    }

    #[test]
    fn base_url_is_trimmed() {
        let client = HttpIntelligence::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
