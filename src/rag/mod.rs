//! RAG (Retrieval-Augmented Generation) module
//!
//! This module provides end-to-end question answering over a local document set:
//! - Loading and normalizing `.txt` and `.json` documents
//! - Recursive chunking and embedding into a similarity index
//! - Semantic retrieval of the best-matching chunks
//! - LLM-based answer generation grounded on the retrieved context
//!
//! # Examples
//!
//! ```rust,no_run
//! use ragbot::rag::RagService;
//! use ragbot::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config)?;
//!
//!     let response = service.query("How do I reset my password?").await?;
//!     println!("Answer: {}", response.answer);
//!     println!("Sources: {} chunks", response.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod chunker;
pub mod composer;
pub mod context;
pub mod index;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
pub mod retriever;

pub use chunker::Chunk;
pub use chunker::RecursiveChunker;
pub use composer::AnswerComposer;
pub use context::ContextAssembler;
pub use index::IndexBuilder;
pub use index::SimilarityIndex;
pub use index::SimilarityMetric;
pub use loader::DocumentLoader;
pub use pipeline::IndexReport;
pub use pipeline::PipelineStage;
pub use pipeline::RagResponse;
pub use pipeline::RagService;
pub use retriever::Retriever;

/// Search result with relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}
