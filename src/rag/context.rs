//! Context assembly from retrieved chunks

use std::collections::HashMap;

use crate::rag::SearchResult;

/// Default context budget in characters
pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 16_000;

/// Assembler for creating context from search results
pub struct ContextAssembler {
    max_context_length: usize,
}

impl ContextAssembler {
    /// Create a new context assembler
    #[must_use]
    pub const fn new(max_context_length: usize) -> Self {
        Self { max_context_length }
    }

    /// Assemble context from search results, in retrieval order
    #[must_use]
    pub fn assemble(&self, results: &[SearchResult]) -> String {
        self.assemble_with_metadata(results).0
    }

    /// Assemble context with per-chunk metadata
    ///
    /// Entries that would push the context past the budget are dropped, along with
    /// everything ranked below them.
    #[must_use]
    pub fn assemble_with_metadata(
        &self,
        results: &[SearchResult],
    ) -> (String, Vec<HashMap<String, String>>) {
        let mut context = String::new();
        let mut metadata = Vec::new();
        let mut total_length = 0;

        for (idx, result) in results.iter().enumerate() {
            let entry = format!("\n[Context {}]\n{}\n", idx + 1, result.chunk.text);
            let entry_length = entry.chars().count();

            if total_length + entry_length > self.max_context_length {
                break;
            }

            context.push_str(&entry);
            total_length += entry_length;

            let mut meta = HashMap::new();
            meta.insert("source".to_string(), result.chunk.source.clone());
            meta.insert("position".to_string(), result.chunk.position.to_string());
            meta.insert("score".to_string(), result.score.to_string());
            metadata.push(meta);
        }

        (context, metadata)
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTEXT_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::chunker::Chunk;

    fn result(text: &str, score: f32) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                text: text.to_string(),
                source: "docs/faq.txt".to_string(),
                position: 0,
            },
            score,
        }
    }

    #[test]
    fn test_assemble_keeps_order_and_labels() {
        let context = ContextAssembler::default().assemble(&[result("alpha", 0.9), result("beta", 0.5)]);
        assert_eq!(context, "\n[Context 1]\nalpha\n\n[Context 2]\nbeta\n");
    }

    #[test]
    fn test_budget_drops_trailing_entries() {
        let (context, metadata) =
            ContextAssembler::new(20).assemble_with_metadata(&[result("short", 0.9), result("much longer text", 0.5)]);
        assert!(context.contains("short"));
        assert!(!context.contains("longer"));
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata[0]["source"], "docs/faq.txt");
    }

    #[test]
    fn test_empty_results() {
        assert!(ContextAssembler::default().assemble(&[]).is_empty());
    }
}
