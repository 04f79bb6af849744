//! Embedding generation service with batch processing

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::StreamExt;
use futures::stream::{
    self,
};
use tracing::debug;
use tracing::info;

use super::client::EmbeddingClient;
use super::prepare_for_embedding;
use super::Embedder;
use super::EmbeddingConfig;
use crate::errors::RagbotError;
use crate::errors::Result;

/// Service for generating embeddings with batching and bounded concurrency
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config))
    }

    /// Create from custom config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
            config.timeout,
        )?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    pub const fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let prepared = prepare_for_embedding(text).ok_or_else(|| {
            RagbotError::EmbeddingProvider("Cannot embed empty text".to_string())
        })?;
        self.client.generate(&prepared).await
    }

    /// Every text must have embeddable content; one vector comes back per text
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let owned = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                prepare_for_embedding(text).ok_or_else(|| {
                    RagbotError::EmbeddingProvider(format!("Cannot embed empty text at position {i}"))
                })
            })
            .collect::<Result<Vec<String>>>()?;
        let prepared: Vec<&str> = owned.iter().map(String::as_str).collect();

        let batch_size = self.config.batch_size.max(1);
        let batch_count = prepared.len().div_ceil(batch_size);
        debug!(
            "Embedding {} texts in {} batches ({} in flight)",
            prepared.len(),
            batch_count,
            self.config.parallel_tasks
        );

        // buffered() yields results in submission order
        let requests: Vec<_> = prepared
            .chunks(batch_size)
            .map(|batch| self.client.generate_batch(batch))
            .collect();
        let results: Vec<Result<Vec<Vec<f32>>>> = stream::iter(requests)
            .buffered(self.config.parallel_tasks.max(1))
            .collect()
            .await;

        let mut embeddings = Vec::with_capacity(prepared.len());
        for result in results {
            embeddings.extend(result?);
        }

        if embeddings.len() != texts.len() {
            return Err(RagbotError::EmbeddingProvider(format!(
                "Expected {} embeddings, received {}",
                texts.len(),
                embeddings.len()
            )));
        }

        info!("Generated {} embeddings", texts.len());
        Ok(embeddings)
    }
}
