//! Reduces raw document payloads to plain text

use tracing::warn;

use crate::errors::RagbotError;
use crate::errors::Result;
use crate::rag::loader::Payload;
use crate::rag::loader::RawDocument;

/// A document reduced to plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub source: String,
    pub text: String,
}

/// Convert a single document's payload to text
pub fn normalize(document: &RawDocument) -> Result<String> {
    match &document.payload {
        Payload::Text(text) => Ok(text.clone()),
        Payload::Lines(lines) => Ok(lines.join("\n")),
        Payload::Unsupported(value) => Err(RagbotError::Normalization {
            source_ref: document.source_ref(),
            reason: format!("unsupported payload shape: {}", json_kind(value)),
        }),
    }
}

/// Normalize a batch, skipping documents that cannot be normalized
pub fn normalize_all(documents: &[RawDocument]) -> Vec<NormalizedDocument> {
    documents
        .iter()
        .filter_map(|document| match normalize(document) {
            Ok(text) => Some(NormalizedDocument {
                source: document.source_ref(),
                text,
            }),
            Err(e) => {
                warn!("{}", e);
                None
            }
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array with non-string items",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;
    use crate::rag::loader::SourceKind;

    fn raw(payload: Payload) -> RawDocument {
        RawDocument {
            source: PathBuf::from("docs/sample.json"),
            kind: SourceKind::Json,
            payload,
        }
    }

    #[test]
    fn test_string_payload_unchanged() {
        let text = "  keeps\n\nall  whitespace ";
        assert_eq!(normalize(&raw(Payload::Text(text.into()))).unwrap(), text);
    }

    #[test]
    fn test_lines_joined_with_newline() {
        let doc = raw(Payload::Lines(vec!["a".into(), "b".into()]));
        assert_eq!(normalize(&doc).unwrap(), "a\nb");
    }

    #[test]
    fn test_empty_lines_payload() {
        assert_eq!(normalize(&raw(Payload::Lines(Vec::new()))).unwrap(), "");
    }

    #[test]
    fn test_unsupported_shape_is_error() {
        let err = normalize(&raw(Payload::Unsupported(json!({"a": 1})))).unwrap_err();
        match err {
            RagbotError::Normalization { source_ref, reason } => {
                assert_eq!(source_ref, "docs/sample.json");
                assert!(reason.contains("object"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_batch_skips_failures() {
        let documents = vec![
            raw(Payload::Text("first".into())),
            raw(Payload::Unsupported(json!(42))),
            raw(Payload::Lines(vec!["x".into(), "y".into()])),
        ];

        let normalized = normalize_all(&documents);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].text, "first");
        assert_eq!(normalized[1].text, "x\ny");
    }
}
