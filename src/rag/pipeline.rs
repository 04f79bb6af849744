//! Complete RAG pipeline: Load -> Normalize -> Chunk -> Index -> Retrieve -> Compose

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::errors::RagbotError;
use crate::errors::Result;
use crate::llm::CompletionModel;
use crate::llm::GenerationParams;
use crate::llm::LlmService;
use crate::rag::cache::content_hash;
use crate::rag::cache::IndexCache;
use crate::rag::index::IndexBuilder;
use crate::rag::index::IndexStore;
use crate::rag::index::SimilarityIndex;
use crate::rag::loader::DocumentLoader;
use crate::rag::normalizer::normalize_all;
use crate::rag::normalizer::NormalizedDocument;
use crate::rag::AnswerComposer;
use crate::rag::RecursiveChunker;
use crate::rag::Retriever;
use crate::rag::SearchResult;

/// Stage of a single pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Loading,
    Normalizing,
    Chunking,
    Indexing,
    Retrieving,
    Composing,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Normalizing => "normalizing",
            Self::Chunking => "chunking",
            Self::Indexing => "indexing",
            Self::Retrieving => "retrieving",
            Self::Composing => "composing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks and logs the stage transitions of one run
struct PipelineRun {
    id: Uuid,
    stage: PipelineStage,
    history: Vec<PipelineStage>,
    started_at: Instant,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: PipelineStage::Idle,
            history: vec![PipelineStage::Idle],
            started_at: Instant::now(),
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        info!(run = %self.id, "Pipeline stage {} -> {}", self.stage, next);
        self.stage = next;
        self.history.push(next);
    }

    fn fail(&mut self, error: &RagbotError) {
        warn!(
            run = %self.id,
            "Pipeline stage {} -> {} after {:?}: {}",
            self.stage,
            PipelineStage::Failed,
            self.started_at.elapsed(),
            error
        );
        self.stage = PipelineStage::Failed;
        self.history.push(PipelineStage::Failed);
    }
}

/// RAG response
#[derive(Debug, Clone)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<SearchResult>,
    pub context: String,
    pub metadata: Vec<HashMap<String, String>>,
    pub query: String,
    pub stages: Vec<PipelineStage>,
    /// Whether a cached index was used instead of rebuilding
    pub index_reused: bool,
}

/// Result of an index-only run
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub documents: Vec<NormalizedDocument>,
    pub index: Arc<SimilarityIndex>,
    pub reused: bool,
}

/// Complete RAG service
pub struct RagService {
    loader: DocumentLoader,
    chunker: RecursiveChunker,
    builder: IndexBuilder,
    retriever: Retriever,
    composer: AnswerComposer,
    store: IndexStore,
    cache: Option<IndexCache>,
}

impl RagService {
    /// Create a new RAG service backed by the configured providers
    ///
    /// # Errors
    /// - Invalid chunking settings
    /// - HTTP client configuration errors
    pub fn new(config: &AppConfig) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(config)?);
        let model: Arc<dyn CompletionModel> = Arc::new(LlmService::new(config)?);
        Self::from_services(config, embedder, model)
    }

    /// Create from existing services
    pub fn from_services(
        config: &AppConfig,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn CompletionModel>,
    ) -> Result<Self> {
        let rag = &config.rag;
        Ok(Self {
            loader: DocumentLoader::new(&rag.documents_dir),
            chunker: RecursiveChunker::new(rag.chunk_size, rag.chunk_overlap)?,
            builder: IndexBuilder::new(Arc::clone(&embedder), rag.metric),
            retriever: Retriever::new(embedder, rag.top_k),
            composer: AnswerComposer::new(model, GenerationParams::from_app_config(config)),
            store: IndexStore::new(&rag.index_path),
            cache: rag.cache_index.then(IndexCache::new),
        })
    }

    pub fn index_path(&self) -> &Path {
        self.store.path()
    }

    pub fn documents_dir(&self) -> &Path {
        self.loader.dir()
    }

    /// Answer a question from the document set
    ///
    /// # Errors
    /// - `Validation` for an empty question, before any stage runs
    /// - Load, index, embedding provider and completion errors from the stage that failed
    pub async fn query(&self, question: &str) -> Result<RagResponse> {
        if question.trim().is_empty() {
            return Err(RagbotError::Validation("query must not be empty".to_string()));
        }

        info!("Processing RAG query: {}", question);
        let mut run = PipelineRun::new();
        match self.run_query(question, &mut run).await {
            Ok(response) => Ok(response),
            Err(e) => {
                run.fail(&e);
                Err(e)
            }
        }
    }

    /// Load, chunk, embed and persist the index without answering
    pub async fn build_index(&self) -> Result<IndexReport> {
        let mut run = PipelineRun::new();
        match self.prepare_index(&mut run).await {
            Ok(report) => {
                run.advance(PipelineStage::Done);
                Ok(report)
            }
            Err(e) => {
                run.fail(&e);
                Err(e)
            }
        }
    }

    async fn run_query(&self, question: &str, run: &mut PipelineRun) -> Result<RagResponse> {
        let report = self.prepare_index(run).await?;

        run.advance(PipelineStage::Retrieving);
        let sources = self.retriever.retrieve(&report.index, question).await?;

        run.advance(PipelineStage::Composing);
        let composed = self.composer.compose(question, &sources).await?;

        run.advance(PipelineStage::Done);
        info!(
            run = %run.id,
            "RAG query completed in {:?} with {} sources",
            run.started_at.elapsed(),
            sources.len()
        );

        Ok(RagResponse {
            answer: composed.answer,
            sources,
            context: composed.context,
            metadata: composed.metadata,
            query: question.to_string(),
            stages: run.history.clone(),
            index_reused: report.reused,
        })
    }

    async fn prepare_index(&self, run: &mut PipelineRun) -> Result<IndexReport> {
        run.advance(PipelineStage::Loading);
        let raw = self.loader.load().await?;

        run.advance(PipelineStage::Normalizing);
        let documents = normalize_all(&raw);
        debug!("Normalized {} of {} documents", documents.len(), raw.len());

        run.advance(PipelineStage::Chunking);
        let chunks = self.chunker.chunk_all(&documents);

        run.advance(PipelineStage::Indexing);
        let hash = content_hash(&documents);

        if let Some(cache) = &self.cache {
            if let Some(index) = cache.get(&hash).await {
                info!("Document set unchanged, reusing cached index ({} entries)", index.len());
                return Ok(IndexReport {
                    documents,
                    index,
                    reused: true,
                });
            }
        }

        let index = Arc::new(self.builder.build(chunks).await?.with_content_hash(hash));
        self.store.persist(&index).await?;

        if let Some(cache) = &self.cache {
            cache.store(Arc::clone(&index)).await;
        }

        Ok(IndexReport {
            documents,
            index,
            reused: false,
        })
    }
}
