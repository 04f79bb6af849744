//! Embeddings generation module
//!
//! This module provides functionality for generating text embeddings using:
//! - OpenAI (text-embedding-ada-002, text-embedding-3-small, etc.)
//! - Ollama (local models)
//!
//! # Examples
//!
//! ```rust,no_run
//! use ragbot::embeddings::Embedder;
//! use ragbot::embeddings::EmbeddingService;
//! use ragbot::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.embed("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;
pub mod text_preprocessing;

use std::time::Duration;

use async_trait::async_trait;
pub use client::EmbeddingClient;
pub use generator::EmbeddingService;
pub use text_preprocessing::prepare_for_embedding;

use crate::config::ProviderKind;
use crate::errors::Result;

/// Maximum batch size for a single OpenAI embeddings call
pub const MAX_BATCH_SIZE: usize = 100;

/// Turns text into vectors.
///
/// The pipeline only talks to this trait so tests can swap in deterministic embedders.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text, typically a query
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts, returning one vector per input in input order
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }
}

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub batch_size: usize,
    pub parallel_tasks: usize,
    pub timeout: Duration,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        let endpoint = config.embedding_endpoint().to_string();
        let provider = config.provider_kind(&endpoint);

        Self {
            provider,
            model: config.embedding_model().to_string(),
            api_key: if provider == ProviderKind::OpenAI {
                Some(config.llm_key().to_string())
            } else {
                None
            },
            endpoint,
            batch_size: config.embeddings.batch_size.min(MAX_BATCH_SIZE),
            parallel_tasks: config.embeddings.parallel_tasks,
            timeout: config.provider_timeout(),
        }
    }
}
