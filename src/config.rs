use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::rag::index::SimilarityMetric;
use crate::security::ApiSecret;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Mount point of the question-answering routes
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
    #[serde(default)]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_route_prefix() -> String {
    "/v1/chatbot-service".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            route_prefix: default_route_prefix(),
            enable_cors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Empty disables audit persistence
    #[serde(default)]
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_log_dir() -> String {
    "logs".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    /// Falls back to the LLM endpoint when unset
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_parallel_tasks")]
    pub parallel_tasks: usize,
}

pub(crate) const fn default_batch_size() -> usize {
    100
}

pub(crate) const fn default_parallel_tasks() -> usize {
    4
}

/// Wire protocol spoken by a provider endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `OpenAI`-compatible `/embeddings` and `/chat/completions`
    OpenAI,
    /// Ollama `/api/embeddings` and `/api/chat`
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    pub llm_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_llm_model() -> String {
    "gpt-4".to_string()
}

pub(crate) const fn default_temperature() -> f32 {
    0.7
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub chunk_overlap: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub metric: SimilarityMetric,
    /// Reuse the last index while the document set is unchanged
    #[serde(default)]
    pub cache_index: bool,
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_index_path() -> PathBuf {
    PathBuf::from("Documents.index")
}

pub(crate) const fn default_chunk_size() -> usize {
    1000
}

pub(crate) const fn default_top_k() -> usize {
    4
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            documents_dir: default_documents_dir(),
            index_path: default_index_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: 0,
            top_k: default_top_k(),
            metric: SimilarityMetric::default(),
            cache_index: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub write_secret: ApiSecret,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Applied to every embedding and completion request
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

const fn default_provider_timeout() -> u64 {
    60
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_provider_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub rag: RagConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from the default config file path, then apply
    /// environment overrides and validate
    pub fn load() -> crate::Result<Self> {
        let mut config = if Path::new("config.toml").exists() {
            Self::from_file("config.toml")?
        } else if Path::new("config.example.toml").exists() {
            eprintln!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")?
        } else {
            return Err(crate::RagbotError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )));
        };
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, then apply environment overrides and validate
    pub fn load_from<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Secrets may come from the environment instead of the config file.
    ///
    /// `lookup` is injected so tests don't have to mutate the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.llm_key = key;
        }
        if let Some(endpoint) = lookup("LLM_ENDPOINT") {
            self.llm.llm_endpoint = endpoint;
        }
        if let Some(raw) = lookup("RAGBOT_WRITE_API_SECRET") {
            self.auth.write_secret = serde_json::from_str(&raw).map_err(|e| {
                crate::RagbotError::Config(format!("RAGBOT_WRITE_API_SECRET is not a valid secret: {e}"))
            })?;
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.rag.chunk_size == 0 {
            return Err(crate::RagbotError::Config(
                "rag.chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(crate::RagbotError::Config(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }
        if self.rag.top_k == 0 {
            return Err(crate::RagbotError::Config(
                "rag.top_k must be greater than 0".to_string(),
            ));
        }
        if self.embeddings.batch_size == 0 || self.embeddings.parallel_tasks == 0 {
            return Err(crate::RagbotError::Config(
                "embeddings.batch_size and embeddings.parallel_tasks must be greater than 0"
                    .to_string(),
            ));
        }
        url::Url::parse(self.llm_endpoint()).map_err(|e| {
            crate::RagbotError::Config(format!("llm.llm_endpoint is not a valid URL: {e}"))
        })?;
        url::Url::parse(self.embedding_endpoint()).map_err(|e| {
            crate::RagbotError::Config(format!("embedding endpoint is not a valid URL: {e}"))
        })?;
        if !self.server.route_prefix.starts_with('/') {
            return Err(crate::RagbotError::Config(
                "server.route_prefix must start with '/'".to_string(),
            ));
        }
        self.auth.write_secret.validate()
    }

    /// Get database URL
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Whether audit persistence is configured
    pub fn database_enabled(&self) -> bool {
        !self.database.url.trim().is_empty()
    }

    /// Get max connections for database pool
    pub fn max_connections(&self) -> u32 {
        self.database.max_connections
    }

    /// Get min connections for database pool
    pub fn min_connections(&self) -> u32 {
        self.database.min_connections
    }

    /// Get connection timeout in seconds
    pub fn connection_timeout(&self) -> u64 {
        self.database.connection_timeout
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Embedding endpoint, defaulting to the LLM endpoint
    pub fn embedding_endpoint(&self) -> &str {
        self.embeddings
            .endpoint
            .as_deref()
            .unwrap_or(&self.llm.llm_endpoint)
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM key
    pub fn llm_key(&self) -> &str {
        &self.llm.llm_key
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }

    /// Provider request timeout
    pub fn provider_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.providers.timeout_secs)
    }

    /// Pick the provider protocol for an endpoint
    ///
    /// Priority: llm_key > endpoint domain. Local or non-OpenAI endpoints are assumed to be Ollama.
    pub fn provider_kind(&self, endpoint: &str) -> ProviderKind {
        if self.llm_key() == "ollama" {
            ProviderKind::Ollama
        } else if endpoint.contains("api.openai.com") {
            ProviderKind::OpenAI
        } else if endpoint.contains("localhost") || !endpoint.contains("openai") {
            ProviderKind::Ollama
        } else {
            ProviderKind::OpenAI
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                min_connections: 1,
                connection_timeout: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_dir: default_log_dir(),
            },
            embeddings: EmbeddingsConfig {
                model: "text-embedding-ada-002".to_string(),
                endpoint: None,
                batch_size: default_batch_size(),
                parallel_tasks: default_parallel_tasks(),
            },
            llm: LlmConfig {
                llm_endpoint: "https://api.openai.com/v1".to_string(),
                llm_key: String::new(),
                llm_model: default_llm_model(),
                temperature: default_temperature(),
                max_tokens: None,
            },
            rag: RagConfig::default(),
            auth: AuthConfig {
                write_secret: ApiSecret::placeholder(),
            },
            providers: ProvidersConfig::default(),
        }
    }
}
