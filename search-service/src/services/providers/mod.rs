//! Completion provider abstractions and implementations.
//!
//! The relay only depends on [`CompletionProvider`], so the Groq client can be
//! swapped for the in-crate mock in tests.

pub mod groq;
pub mod mock;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Error type for provider operations.
///
/// Both variants display as their bare message because the relay hands that
/// text straight back to the caller.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("{0}")]
    Api(String),

    /// The request never produced a response.
    #[error("{0}")]
    Network(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
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

/// Chat completion request in the OpenAI-compatible shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f64,
    pub messages: Vec<ChatMessage>,
}

/// Result of a completion call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// First choice's message content, if the response carried one.
    pub content: Option<String>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}
