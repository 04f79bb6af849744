//! Recursive text chunking
//!
//! Text is split at the coarsest separator that yields pieces within the size limit:
//! paragraphs, then lines, then sentences, then words, and finally a hard character cut.
//! Separators stay attached to the piece before them, so the pieces of a document always
//! concatenate back to the original text.

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::RagbotError;
use crate::errors::Result;
use crate::rag::normalizer::NormalizedDocument;

/// Default maximum chunk length in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "! ", "? ", " "];

/// A bounded segment of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Source reference of the document this chunk came from
    pub source: String,
    /// Position of the chunk within its document
    pub position: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: 0,
        }
    }
}

impl RecursiveChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagbotError::Config("chunk_size must be greater than 0".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagbotError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split text into chunks of at most `chunk_size` characters
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        // Leave room for the overlap prefix carried over from the previous piece
        let step = self.chunk_size - self.chunk_overlap;
        let pieces = split_recursive(text, step, &SEPARATORS);

        if self.chunk_overlap == 0 {
            return pieces;
        }

        let mut chunks = Vec::with_capacity(pieces.len());
        for (i, piece) in pieces.iter().enumerate() {
            if i == 0 {
                chunks.push(piece.clone());
            } else {
                let mut chunk = tail(&pieces[i - 1], self.chunk_overlap).to_string();
                chunk.push_str(piece);
                chunks.push(chunk);
            }
        }
        chunks
    }

    /// Chunk a single normalized document. Whitespace-only pieces carry nothing to
    /// retrieve and are dropped.
    pub fn chunk(&self, document: &NormalizedDocument) -> Vec<Chunk> {
        self.split_text(&document.text)
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .enumerate()
            .map(|(position, text)| Chunk {
                text,
                source: document.source.clone(),
                position,
            })
            .collect()
    }

    /// Chunk every document, preserving document order
    pub fn chunk_all(&self, documents: &[NormalizedDocument]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents.iter().flat_map(|doc| self.chunk(doc)).collect();
        debug!(
            "Split {} documents into {} chunks (size {}, overlap {})",
            documents.len(),
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap
        );
        chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Last `n` characters of `text`
fn tail(text: &str, n: usize) -> &str {
    let len = char_len(text);
    if len <= n {
        return text;
    }
    let start = text
        .char_indices()
        .nth(len - n)
        .map_or(text.len(), |(idx, _)| idx);
    &text[start..]
}

fn split_recursive(text: &str, limit: usize, separators: &[&str]) -> Vec<String> {
    if char_len(text) <= limit {
        return vec![text.to_string()];
    }

    let Some((separator, rest)) = separators.split_first() else {
        return hard_split(text, limit);
    };

    let segments = split_keeping_separator(text, separator);
    if segments.len() <= 1 {
        return split_recursive(text, limit, rest);
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for segment in segments {
        let segment_len = char_len(segment);

        if segment_len > limit {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            pieces.extend(split_recursive(segment, limit, rest));
        } else if current_len + segment_len <= limit {
            current.push_str(segment);
            current_len += segment_len;
        } else {
            pieces.push(std::mem::replace(&mut current, segment.to_string()));
            current_len = segment_len;
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

/// Split at a separator, keeping the separator attached to the preceding segment
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Cut into runs of `limit` characters, never inside a code point
fn hard_split(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(limit).map(|run| run.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn doc(text: &str) -> NormalizedDocument {
        NormalizedDocument {
            source: "docs/a.txt".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = RecursiveChunker::default();
        assert_eq!(chunker.split_text("hello world"), vec!["hello world"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(RecursiveChunker::default().split_text("").is_empty());
        assert!(RecursiveChunker::default().chunk(&doc("")).is_empty());
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let chunker = RecursiveChunker::new(12, 0).unwrap();
        let chunks = chunker.split_text("first para\n\nsecond one\n\nthird");
        assert_eq!(chunks, vec!["first para\n\n", "second one\n\n", "third"]);
    }

    #[test]
    fn test_falls_back_to_words_then_characters() {
        let chunker = RecursiveChunker::new(5, 0).unwrap();
        assert_eq!(chunker.split_text("ab cd efghijkl"), vec!["ab ", "cd ", "efghi", "jkl"]);
    }

    #[test]
    fn test_multibyte_text_is_cut_on_char_boundaries() {
        let chunker = RecursiveChunker::new(3, 0).unwrap();
        let chunks = chunker.split_text("日本語テキスト");
        assert_eq!(chunks, vec!["日本語", "テキス", "ト"]);
    }

    #[test]
    fn test_overlap_prefixes_previous_tail() {
        let chunker = RecursiveChunker::new(6, 2).unwrap();
        let chunks = chunker.split_text("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "cdefgh", "ghij"]);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(RecursiveChunker::new(0, 0).is_err());
        assert!(RecursiveChunker::new(10, 10).is_err());
        assert!(RecursiveChunker::new(10, 9).is_ok());
    }

    #[test]
    fn test_chunks_carry_source_and_position() {
        let chunker = RecursiveChunker::new(4, 0).unwrap();
        // "aaaa bbbb" splits into "aaaa", " ", "bbbb"; the lone space is dropped
        let chunks = chunker.chunk_all(&[doc("aaaa bbbb"), doc("cc")]);

        assert_eq!(
            chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>(),
            vec!["aaaa", "bbbb", "cc"]
        );
        assert!(chunks.iter().all(|c| c.source == "docs/a.txt"));
        assert_eq!(
            chunks.iter().map(|c| c.position).collect::<Vec<_>>(),
            vec![0, 1, 0]
        );
    }

    #[test]
    fn test_whitespace_only_documents_yield_no_chunks() {
        let chunker = RecursiveChunker::default();
        assert!(chunker.chunk(&doc("   \n\n  ")).is_empty());

        let chunks = chunker.chunk_all(&[doc("Billing is monthly."), doc("\t\n")]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Billing is monthly.");
    }

    proptest! {
        #[test]
        fn prop_chunks_reconstruct_text(text in "\\PC{0,400}", size in 1usize..80) {
            let chunker = RecursiveChunker::new(size, 0).unwrap();
            let chunks = chunker.split_text(&text);
            prop_assert_eq!(chunks.concat(), text);
        }

        #[test]
        fn prop_chunks_respect_size(
            text in "[a-z .!?\\n]{0,400}",
            size in 2usize..80,
            overlap_ratio in 0usize..100,
        ) {
            let overlap = (size - 1) * overlap_ratio / 100;
            let chunker = RecursiveChunker::new(size, overlap).unwrap();
            for chunk in chunker.split_text(&text) {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= size);
            }
        }

        #[test]
        fn prop_chunking_is_deterministic(text in "\\PC{0,200}", size in 1usize..40) {
            let chunker = RecursiveChunker::new(size, 0).unwrap();
            prop_assert_eq!(chunker.split_text(&text), chunker.split_text(&text));
        }

        #[test]
        fn prop_chunks_are_never_blank(text in "[a \\t\\n]{0,200}", size in 1usize..20) {
            let chunker = RecursiveChunker::new(size, 0).unwrap();
            for chunk in chunker.chunk(&doc(&text)) {
                prop_assert!(!chunk.text.trim().is_empty());
            }
        }
    }
}
