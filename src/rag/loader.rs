//! Document loading from the source directory
//!
//! Walks the configured directory (recursively) and reads every `.txt` and `.json`
//! file. Files that cannot be read or parsed are skipped with a warning; the load
//! only fails when the directory itself is unreadable or nothing could be loaded.

use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::errors::RagbotError;
use crate::errors::Result;

/// Source format of a loaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    Json,
}

impl SourceKind {
    /// Determine the source kind from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Native shape of a document's content
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A single string
    Text(String),
    /// A sequence of strings
    Lines(Vec<String>),
    /// Any other JSON shape; cannot be normalized
    Unsupported(Value),
}

impl Payload {
    /// Classify a parsed JSON value
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Array(items) if items.iter().all(Value::is_string) => Self::Lines(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            other => Self::Unsupported(other),
        }
    }
}

/// A document as read from disk, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub source: PathBuf,
    pub kind: SourceKind,
    pub payload: Payload,
}

impl RawDocument {
    /// Source path as a display string, used to trace chunks back to documents
    pub fn source_ref(&self) -> String {
        self.source.display().to_string()
    }
}

/// Loads raw documents from a directory
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    dir: PathBuf,
}

impl DocumentLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every supported document, in path order
    pub async fn load(&self) -> Result<Vec<RawDocument>> {
        let paths = self.collect_paths().await?;
        let mut documents = Vec::with_capacity(paths.len());
        let mut skipped = 0usize;

        for path in paths {
            match load_file(&path).await {
                Ok(Some(document)) => documents.push(document),
                Ok(None) => debug!("Ignoring unsupported file {}", path.display()),
                Err(e) => {
                    warn!("Skipping document {}: {}", path.display(), e);
                    skipped += 1;
                }
            }
        }

        if documents.is_empty() {
            return Err(RagbotError::Load(format!(
                "no documents could be loaded from {} ({} skipped)",
                self.dir.display(),
                skipped
            )));
        }

        info!(
            "Loaded {} documents from {} ({} skipped)",
            documents.len(),
            self.dir.display(),
            skipped
        );
        Ok(documents)
    }

    async fn collect_paths(&self) -> Result<Vec<PathBuf>> {
        let mut root = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            RagbotError::Load(format!("cannot read directory {}: {e}", self.dir.display()))
        })?;

        let mut files = Vec::new();
        let mut pending = Vec::new();
        drain_dir(&mut root, &mut files, &mut pending).await?;

        while let Some(dir) = pending.pop() {
            match tokio::fs::read_dir(&dir).await {
                Ok(mut entries) => drain_dir(&mut entries, &mut files, &mut pending).await?,
                Err(e) => warn!("Skipping directory {}: {}", dir.display(), e),
            }
        }

        files.sort();
        Ok(files)
    }
}

async fn drain_dir(
    entries: &mut tokio::fs::ReadDir,
    files: &mut Vec<PathBuf>,
    dirs: &mut Vec<PathBuf>,
) -> Result<()> {
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}

async fn load_file(path: &Path) -> Result<Option<RawDocument>> {
    let Some(kind) = SourceKind::from_path(path) else {
        return Ok(None);
    };

    let content = tokio::fs::read_to_string(path).await?;
    let payload = match kind {
        SourceKind::Text => Payload::Text(content),
        SourceKind::Json => Payload::from_json(serde_json::from_str(&content)?),
    };

    Ok(Some(RawDocument {
        source: path.to_path_buf(),
        kind,
        payload,
    }))
}
