//! Similarity index: embedded chunks, search, and on-disk persistence

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;

use crate::embeddings::Embedder;
use crate::errors::RagbotError;
use crate::errors::Result;
use crate::rag::chunker::Chunk;
use crate::rag::SearchResult;

/// Version written into every saved index file
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// How query and chunk vectors are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    #[default]
    Cosine,
    InnerProduct,
}

impl SimilarityMetric {
    /// Higher is more similar
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::InnerProduct => dot(a, b),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// Ordered `(chunk, vector)` entries sharing one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityIndex {
    format_version: u32,
    metric: SimilarityMetric,
    dimension: usize,
    /// Hash of the document set the index was built from, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_hash: Option<String>,
    entries: Vec<IndexEntry>,
}

impl SimilarityIndex {
    /// Pair chunks with their vectors
    ///
    /// # Errors
    /// - `Index` when there are no chunks
    /// - `EmbeddingProvider` when the vector count differs from the chunk count, or the
    ///   vectors are empty or of differing dimensions
    pub fn from_parts(
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
        metric: SimilarityMetric,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(RagbotError::Index(
                "cannot build an index from zero chunks".to_string(),
            ));
        }
        if vectors.len() != chunks.len() {
            return Err(RagbotError::EmbeddingProvider(format!(
                "received {} embeddings for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let dimension = vectors[0].len();
        if dimension == 0 {
            return Err(RagbotError::EmbeddingProvider(
                "received an empty embedding vector".to_string(),
            ));
        }
        if let Some(bad) = vectors.iter().position(|v| v.len() != dimension) {
            return Err(RagbotError::EmbeddingProvider(format!(
                "embedding {bad} has dimension {}, expected {dimension}",
                vectors[bad].len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();

        Ok(Self {
            format_version: INDEX_FORMAT_VERSION,
            metric,
            dimension,
            content_hash: None,
            entries,
        })
    }

    #[must_use]
    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    pub const fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `k` entries by score, best first; equal scores keep insertion order
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimension {
            return Err(RagbotError::EmbeddingProvider(format!(
                "query embedding has dimension {}, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, self.metric.score(query, &entry.vector)))
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(idx, score)| SearchResult {
                chunk: self.entries[idx].chunk.clone(),
                score,
            })
            .collect())
    }

    /// Write the index to `path` through a temporary file and an atomic rename
    pub async fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec(self)?;
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| RagbotError::Index(format!("index writer task failed: {e}")))?
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let index: Self = serde_json::from_slice(&bytes)?;
        if index.format_version != INDEX_FORMAT_VERSION {
            return Err(RagbotError::Index(format!(
                "unsupported index format version {} in {}",
                index.format_version,
                path.display()
            )));
        }
        Ok(index)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| RagbotError::Index(format!("cannot replace {}: {e}", path.display())))?;
    Ok(())
}

/// Embeds chunks and assembles them into an index
#[derive(Clone)]
pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    metric: SimilarityMetric,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn Embedder>, metric: SimilarityMetric) -> Self {
        Self { embedder, metric }
    }

    pub async fn build(&self, chunks: Vec<Chunk>) -> Result<SimilarityIndex> {
        if chunks.is_empty() {
            return Err(RagbotError::Index(
                "cannot build an index from zero chunks".to_string(),
            ));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        let index = SimilarityIndex::from_parts(chunks, vectors, self.metric)?;

        debug!(
            "Built index with {} entries of dimension {}",
            index.len(),
            index.dimension()
        );
        Ok(index)
    }
}

/// The on-disk index location with a single in-process writer
pub struct IndexStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist an index; concurrent callers are serialized
    pub async fn persist(&self, index: &SimilarityIndex) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        index.save(&self.path).await?;
        info!(
            "Saved index with {} entries to {}",
            index.len(),
            self.path.display()
        );
        Ok(())
    }

    pub async fn load(&self) -> Result<SimilarityIndex> {
        SimilarityIndex::load(&self.path).await
    }
}
