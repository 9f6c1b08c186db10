//! Menu Assistant
//!
//! Answers customer questions about the menu using a third-party
//! generative-language API.
//!
//! ## Architecture
//!
//! - **LanguageModel**: Seam between the chat logic and the remote model
//! - **GenerativeClient**: REST client for the Gemini `generateContent` API
//! - **ChatAssistant**: Transcript, prompt construction, fallback replies

mod chat;
mod client;

pub use chat::{AskOutcome, ChatAssistant, ChatTurn, EMPTY_REPLY, FALLBACK_REPLY};
pub use client::{GenerativeClient, GenerativeConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speaker of a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One message sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: ChatRole,
    pub text: String,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A text-generating model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a reply for the conversation so far
    async fn generate(&self, contents: &[Content]) -> Result<String, AssistantError>;
}

/// Errors that can occur when talking to the language model
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Language model unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,
}
