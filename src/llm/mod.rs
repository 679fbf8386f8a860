//! External text generation
//!
//! The answerer only talks to a [`TextGenerator`]; [`ChatClient`] is the production
//! implementation against an OpenAI-compatible chat completions API.

pub mod client;

use async_trait::async_trait;
pub use client::ChatClient;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Result;

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `request`
    ///
    /// Network, status and response-shape failures surface as
    /// [`crate::CaseRagError::HttpError`] or [`crate::CaseRagError::LlmError`].
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
