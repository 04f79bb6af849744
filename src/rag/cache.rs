//! Optional reuse of the last built index while the document set is unchanged

use std::sync::Arc;

use sha2::Digest;
use sha2::Sha256;
use tokio::sync::RwLock;

use crate::rag::index::SimilarityIndex;
use crate::rag::normalizer::NormalizedDocument;

/// SHA-256 over every document's source and text, hex encoded
///
/// Lengths are mixed in so that moving text between documents changes the hash.
pub fn content_hash(documents: &[NormalizedDocument]) -> String {
    let mut hasher = Sha256::new();
    for document in documents {
        hasher.update((document.source.len() as u64).to_le_bytes());
        hasher.update(document.source.as_bytes());
        hasher.update((document.text.len() as u64).to_le_bytes());
        hasher.update(document.text.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[derive(Default)]
pub struct IndexCache {
    current: RwLock<Option<Arc<SimilarityIndex>>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached index, if it was built from documents with this hash
    pub async fn get(&self, hash: &str) -> Option<Arc<SimilarityIndex>> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|index| index.content_hash() == Some(hash))
            .cloned()
    }

    pub async fn store(&self, index: Arc<SimilarityIndex>) {
        *self.current.write().await = Some(index);
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}
