//! Questions about a document answered by a chat model.
//!
//! The model only ever sees the raw document text, never the structured
//! extraction result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChatError;
use crate::models::config::ChatConfig;

const SYSTEM_PROMPT: &str = "You are an expert financial assistant who reads and understands \
invoice documents. Based *only* on the text provided below, answer the user's question. \
If the answer is not in the text, say that you cannot find the information in the document.";

/// Reply shown when no API key was given.
pub const MISSING_KEY_MESSAGE: &str = "Please enter your OpenRouter API Key first.";

/// Reply shown when the question is blank.
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question about the document.";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Outcome of a question. Failures are shown to the user like answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ChatReply {
    Answer(String),
    Failure(String),
}

impl ChatReply {
    pub fn text(&self) -> &str {
        match self {
            ChatReply::Answer(text) | ChatReply::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ChatReply::Failure(_))
    }

    pub fn into_text(self) -> String {
        match self {
            ChatReply::Answer(text) | ChatReply::Failure(text) => text,
        }
    }
}

/// A chat completion service.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Complete the conversation, returning the assistant's reply.
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, ChatError> {
        (**self).complete(api_key, messages).await
    }
}

/// OpenAI-compatible client for OpenRouter.
pub struct OpenRouterClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenRouterClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, messages: &'a [ChatMessage]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl ChatBackend for OpenRouterClient {
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let start = Instant::now();
        debug!(model = %self.model, "Sending chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&self.request_body(messages))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ChatError::EmptyResponse)?;

        debug!("Chat completion received in {:?}", start.elapsed());
        Ok(content)
    }
}

/// Answers questions about one document's text.
pub struct DocumentAssistant<B: ChatBackend> {
    backend: B,
}

impl<B: ChatBackend> DocumentAssistant<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// System prompt followed by the document text and the question.
    pub fn conversation(question: &str, context: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Here is the document text:\n---\n{}\n---\nMy question is: {}",
                context, question
            )),
        ]
    }

    /// Ask a question. Never fails; problems come back as [`ChatReply::Failure`].
    pub async fn ask(&self, question: &str, context: &str, api_key: &str) -> ChatReply {
        if api_key.trim().is_empty() {
            return ChatReply::Failure(MISSING_KEY_MESSAGE.to_string());
        }
        if question.trim().is_empty() {
            return ChatReply::Failure(EMPTY_QUESTION_MESSAGE.to_string());
        }

        let messages = Self::conversation(question, context);
        match self.backend.complete(api_key.trim(), &messages).await {
            Ok(answer) => ChatReply::Answer(answer),
            Err(e) => {
                warn!("Chat request failed: {}", e);
                ChatReply::Failure(format!(
                    "Error: Could not get a response from the OpenRouter model. Details: {}",
                    e
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        reply: Option<String>,
        calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    impl RecordingBackend {
        fn answering(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                ..Default::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatBackend for RecordingBackend {
        async fn complete(
            &self,
            api_key: &str,
            messages: &[ChatMessage],
        ) -> Result<String, ChatError> {
            self.calls
                .lock()
                .unwrap()
                .push((api_key.to_string(), messages.to_vec()));
            self.reply.clone().ok_or(ChatError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn test_ask_sends_document_text() {
        let assistant = DocumentAssistant::new(RecordingBackend::answering("It is AB1234."));
        let reply = assistant
            .ask("What is the invoice number?", "INVOICE AB1234", "sk-test")
            .await;

        assert_eq!(reply, ChatReply::Answer("It is AB1234.".to_string()));

        let calls = assistant.backend().calls.lock().unwrap();
        let (key, messages) = &calls[0];
        assert_eq!(key, "sk-test");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("Based *only* on the text"));
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(
            messages[1].content,
            "Here is the document text:\n---\nINVOICE AB1234\n---\nMy question is: What is the invoice number?"
        );
    }

    #[tokio::test]
    async fn test_missing_key_skips_backend() {
        let assistant = DocumentAssistant::new(RecordingBackend::answering("unused"));
        let reply = assistant.ask("Total?", "text", "  ").await;

        assert_eq!(reply, ChatReply::Failure(MISSING_KEY_MESSAGE.to_string()));
        assert_eq!(assistant.backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_error_becomes_failure() {
        let assistant = DocumentAssistant::new(RecordingBackend::default());
        let reply = assistant.ask("Total?", "text", "sk-test").await;

        assert!(reply.is_failure());
        assert!(reply
            .text()
            .starts_with("Error: Could not get a response from the OpenRouter model. Details:"));
    }

    #[tokio::test]
    async fn test_shared_backend() {
        let backend: Arc<dyn ChatBackend> = Arc::new(RecordingBackend::answering("yes"));
        let assistant = DocumentAssistant::new(backend);

        assert_eq!(assistant.ask("Paid?", "text", "k").await.into_text(), "yes");
    }

    #[test]
    fn test_request_body() {
        let client = OpenRouterClient::new(&ChatConfig::default()).unwrap();
        let messages = DocumentAssistant::<OpenRouterClient>::conversation("Q", "C");
        let body = serde_json::to_value(client.request_body(&messages)).unwrap();

        assert_eq!(body["model"], "anthropic/claude-3-haiku");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
    }
}
