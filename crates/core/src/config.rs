//! Configuration management for ragline.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.ragline/config.yaml)
//!
//! Configuration is built exactly once at startup and passed by reference to
//! each component constructor. There is no module-level mutable state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .ragline/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Chat-completion provider settings
    pub chat: ChatSettings,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Vector index backend settings
    pub index: IndexSettings,

    /// Number of chunks to retrieve per query
    pub top_k: usize,

    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Chat-completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Provider name (e.g. "openai")
    pub provider: String,

    /// Model identifier (e.g. "gpt-3.5-turbo")
    pub model: String,

    /// Optional custom endpoint URL
    pub endpoint: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in a completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    300
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            endpoint: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name: "pinecone" (hosted) or "trigram" (local, deterministic)
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Optional custom endpoint URL
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Vector index backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Backend name: "sqlite" (local file-backed) or "pinecone" (hosted)
    pub backend: String,

    /// Named partition within the index
    pub namespace: String,

    /// Hosted index endpoint URL (pinecone backend only)
    pub endpoint: Option<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            namespace: "default".to_string(),
            endpoint: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    chat: Option<ChatSettings>,
    embedding: Option<EmbeddingSettings>,
    index: Option<IndexSettings>,
    retrieval: Option<RetrievalConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalConfig {
    top_k: Option<usize>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            chat: ChatSettings::default(),
            embedding: EmbeddingSettings::default(),
            index: IndexSettings::default(),
            top_k: 4,
            chunk_size: 512,
            chunk_overlap: 64,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `RAGLINE_WORKSPACE`: Override workspace path
    /// - `RAGLINE_CONFIG`: Path to config file
    /// - `RAGLINE_CHAT_PROVIDER` / `RAGLINE_CHAT_MODEL`: Chat provider/model
    /// - `RAGLINE_EMBED_PROVIDER` / `RAGLINE_EMBED_MODEL`: Embedding provider/model
    /// - `RAGLINE_INDEX_BACKEND`: Vector index backend
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// Secrets (`OPENAI_API_KEY`, `PINECONE_API_KEY`) are resolved on demand
    /// via [`AppConfig::require_api_key`], not stored in the struct.
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("RAGLINE_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("RAGLINE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Validate workspace exists
        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".ragline/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("RAGLINE_CHAT_PROVIDER") {
            config.chat.provider = provider;
        }
        if let Ok(model) = std::env::var("RAGLINE_CHAT_MODEL") {
            config.chat.model = model;
        }
        if let Ok(provider) = std::env::var("RAGLINE_EMBED_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Ok(model) = std::env::var("RAGLINE_EMBED_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(backend) = std::env::var("RAGLINE_INDEX_BACKEND") {
            config.index.backend = backend;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(chat) = config_file.chat {
            result.chat = chat;
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(index) = config_file.index {
            result.index = index;
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(top_k) = retrieval.top_k {
                result.top_k = top_k;
            }
            if let Some(chunk_size) = retrieval.chunk_size {
                result.chunk_size = chunk_size;
            }
            if let Some(chunk_overlap) = retrieval.chunk_overlap {
                result.chunk_overlap = chunk_overlap;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        chat_provider: Option<String>,
        chat_model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = chat_provider {
            self.chat.provider = provider;
        }

        if let Some(model) = chat_model {
            self.chat.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .ragline directory.
    pub fn ragline_dir(&self) -> PathBuf {
        self.workspace.join(".ragline")
    }

    /// Ensure the .ragline directory exists.
    pub fn ensure_ragline_dir(&self) -> AppResult<()> {
        let dir = self.ragline_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .ragline directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Path to the local file-backed vector index.
    pub fn index_path(&self) -> PathBuf {
        self.ragline_dir().join("index.sqlite3")
    }

    /// Resolve a required API key from the environment.
    ///
    /// Absence of a secret a selected remote provider needs is a fatal
    /// configuration error, not a recoverable one.
    pub fn require_api_key(&self, env_var: &str) -> AppResult<String> {
        std::env::var(env_var).map_err(|_| {
            AppError::Config(format!(
                "Required secret not found in environment variable: {}",
                env_var
            ))
        })
    }

    /// Validate configuration before any command runs.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        let known_chat = ["openai"];
        if !known_chat.contains(&self.chat.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown chat provider: {}. Supported: {}",
                self.chat.provider,
                known_chat.join(", ")
            )));
        }

        let known_embed = ["pinecone", "trigram"];
        if !known_embed.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_embed.join(", ")
            )));
        }

        let known_index = ["sqlite", "pinecone"];
        if !known_index.contains(&self.index.backend.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown index backend: {}. Supported: {}",
                self.index.backend,
                known_index.join(", ")
            )));
        }

        // Remote providers need their secrets up front
        if self.chat.provider == "openai" {
            self.require_api_key("OPENAI_API_KEY")?;
        }

        if self.embedding.provider == "pinecone" || self.index.backend == "pinecone" {
            self.require_api_key("PINECONE_API_KEY")?;
        }

        Ok(())
    }
}
