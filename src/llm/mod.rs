//! Chat-completion models used to compose answers

pub mod client;

use async_trait::async_trait;
pub use client::LlmService;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Result;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling parameters for a completion call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }
}

impl GenerationParams {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        Self {
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }
}

/// A language model that answers a conversation with a single reply
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], params: GenerationParams) -> Result<String>;
}
