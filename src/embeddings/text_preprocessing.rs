//! Text preparation before embedding
//!
//! Chunks keep their original text in the index; only the copy sent to the provider is
//! cleaned up here.

/// Collapse newlines, tabs and runs of whitespace into single spaces
///
/// Returns `None` when nothing embeddable is left.
pub fn prepare_for_embedding(text: &str) -> Option<String> {
    let normalized = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ");

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
