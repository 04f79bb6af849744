//! Retrieval of the best-matching chunks for a query

use std::sync::Arc;

use tracing::debug;

use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::rag::index::SimilarityIndex;
use crate::rag::SearchResult;

/// Retriever for semantic search over a similarity index
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self { embedder, top_k }
    }

    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed the query with the index's provider and return the top matches
    pub async fn retrieve(&self, index: &SimilarityIndex, query: &str) -> Result<Vec<SearchResult>> {
        debug!("Performing semantic search: {}", query);

        let query_embedding = self.embedder.embed(query).await?;
        let results = index.search(&query_embedding, self.top_k)?;

        debug!(
            "Retrieved {} of {} chunks (top score {:.4})",
            results.len(),
            index.len(),
            results.first().map_or(0.0, |r| r.score)
        );
        Ok(results)
    }
}
