//! Completion capability: "given a structured prompt, return text".
//!
//! The orchestrator only sees [`CompletionProvider`]. The production provider
//! drives an ACP agent process; [`ScriptedCompletion`] replays canned responses.

mod acp_client;
mod acp_worker;
mod scripted;

pub use acp_worker::{AcpCompletion, AcpCompletionConfig};
pub use scripted::ScriptedCompletion;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// One role-tagged prompt plus sampling hints. Providers may ignore the hints.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Short label for logs ("generate", "explain", ...).
    pub purpose: &'static str,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub cancel: Option<CancellationToken>,
}

impl CompletionRequest {
    pub fn new(purpose: &'static str, messages: Vec<ChatMessage>) -> Self {
        Self {
            purpose,
            messages,
            temperature: None,
            max_tokens: None,
            cancel: None,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn cancel_token(mut self, token: Option<CancellationToken>) -> Self {
        self.cancel = token;
        self
    }

    /// Flatten the messages into one prompt for providers that take a single text block.
    pub fn flatten(&self) -> String {
        self.messages
            .iter()
            .map(|message| {
                let tag = match message.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                };
                format!("<{tag}>\n{}\n</{tag}>", message.content.trim())
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("No content received from the completion provider")]
    Empty,

    #[error("Completion timed out after {0}s")]
    TimedOut(u64),

    #[error("Completion cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

impl From<anyhow::Error> for CompletionError {
    fn from(err: anyhow::Error) -> Self {
        CompletionError::Failed(format!("{err:#}"))
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Returns the trimmed response text. Empty content is [`CompletionError::Empty`].
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}
