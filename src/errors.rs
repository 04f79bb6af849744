use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagbotError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to load documents: {0}")]
    Load(String),

    #[error("Failed to normalize document {source_ref}: {reason}")]
    Normalization { source_ref: String, reason: String },

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl RagbotError {
    /// Provider-side failures, as opposed to errors in the pipeline's own logic
    pub const fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingProvider(_) | Self::Completion(_) | Self::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RagbotError>;
