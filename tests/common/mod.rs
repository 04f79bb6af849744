//! Shared fakes and fixtures for integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use ragbot::embeddings::Embedder;
use ragbot::llm::ChatMessage;
use ragbot::llm::CompletionModel;
use ragbot::llm::GenerationParams;
use ragbot::rag::RagService;
use ragbot::security::ApiSecret;
use ragbot::AppConfig;
use ragbot::RagbotError;
use ragbot::Result;

pub const TEST_API_KEY: &str = "test-write-key";

const VOCABULARY: [&str; 6] = ["password", "reset", "billing", "rust", "python", "language"];

/// Embeds text as keyword counts over a small vocabulary
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect();
        vector.push(0.01);
        Ok(vector)
    }
}

/// Always fails like an unreachable provider
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagbotError::EmbeddingProvider("provider unavailable".to_string()))
    }
}

/// Succeeds for the first `healthy_calls` embeddings, then fails every call
pub struct FailAfterEmbedder {
    healthy_calls: usize,
    inner: KeywordEmbedder,
}

impl FailAfterEmbedder {
    pub fn new(healthy_calls: usize) -> Self {
        Self {
            healthy_calls,
            inner: KeywordEmbedder::default(),
        }
    }
}

#[async_trait]
impl Embedder for FailAfterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.inner.calls() >= self.healthy_calls {
            return Err(RagbotError::EmbeddingProvider("rate limited".to_string()));
        }
        self.inner.embed(text).await
    }
}

/// Returns a fixed answer and records every prompt it was given
pub struct RecordingModel {
    pub answer: String,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingModel {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionModel for RecordingModel {
    async fn complete(&self, messages: &[ChatMessage], _params: GenerationParams) -> Result<String> {
        let prompt = messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n");
        self.prompts.lock().unwrap().push(prompt);
        Ok(self.answer.clone())
    }
}

/// Config pointing at a temporary documents directory and index path
pub fn test_config(root: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.rag.documents_dir = root.join("docs");
    config.rag.index_path = root.join("Documents.index");
    config.auth.write_secret =
        ApiSecret::with_salt(TEST_API_KEY, vec![10, 11, 12, 13, 14, 15, 16, 17], 4).unwrap();
    config
}

/// Write the standard two-document corpus
pub fn write_corpus(root: &Path) {
    let docs = root.join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(
        docs.join("faq.txt"),
        "To reset your password, open settings and choose reset password.",
    )
    .unwrap();
    std::fs::write(
        docs.join("languages.json"),
        r#"["Rust is a systems language.", "Python is a scripting language."]"#,
    )
    .unwrap();
}

pub fn rag_service(
    config: &AppConfig,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn CompletionModel>,
) -> RagService {
    RagService::from_services(config, embedder, model).unwrap()
}
