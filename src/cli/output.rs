//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `ragbot` CLI

use crate::rag::SearchResult;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print retrieved chunks with their scores
pub fn print_sources(sources: &[SearchResult]) {
    println!("Sources ({} chunks):", sources.len());
    for (idx, source) in sources.iter().enumerate() {
        println!(
            "  {}. {} #{} (score {:.4})\n     {}",
            idx + 1,
            source.chunk.source,
            source.chunk.position,
            source.score,
            truncate_str(&source.chunk.text.replace('\n', " "), 100)
        );
    }
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}
