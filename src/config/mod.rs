//! Configuration management for ledgerlens
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Qdrant connection URL
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Qdrant collection name
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Timeout applied to every remote collaborator call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Document conversion service
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Embedding backend
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Reranker backend
    #[serde(default)]
    pub reranker: RerankerConfig,

    /// Query expansion backend
    #[serde(default)]
    pub expansion: ExpansionConfig,

    /// Splitting configuration
    #[serde(default)]
    pub split: SplitConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Conversion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Service URL
    #[serde(default = "default_conversion_url")]
    pub url: String,

    /// Free-form structural conventions sent with every conversion request
    #[serde(default = "default_conversion_instructions")]
    pub instructions: String,
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name/identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension (must match model)
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Backend URL
    #[serde(default = "default_embedding_url")]
    pub url: String,
}

/// Reranker backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    /// Model name/identifier for the cross-encoder
    #[serde(default = "default_reranker_model")]
    pub model: String,

    /// Backend URL
    #[serde(default = "default_reranker_url")]
    pub url: String,
}

/// Query expansion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Text-generation backend URL
    #[serde(default = "default_expansion_url")]
    pub url: String,

    /// Model used for paraphrase generation
    #[serde(default = "default_expansion_model")]
    pub model: String,

    /// Paraphrase queries derived per user query
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

/// Splitting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Child window length in characters
    #[serde(default = "default_child_window")]
    pub child_window: usize,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Results returned to the caller
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Candidates fetched per similarity query before reranking
    #[serde(default = "default_candidates")]
    pub candidates: usize,

    /// Derive paraphrase queries via the text-generation backend
    #[serde(default = "default_expand_queries")]
    pub expand_queries: bool,

    /// Map child hits back to their parent sections before reranking
    #[serde(default = "default_resolve_parents")]
    pub resolve_parents: bool,

    /// Drop boilerplate candidates before reranking
    #[serde(default = "default_density_filter")]
    pub density_filter: bool,

    /// Pipe count above which a candidate is kept as tabular
    #[serde(default = "default_density_min_pipes")]
    pub density_min_pipes: usize,

    /// Length above which a candidate is kept regardless of pipes
    #[serde(default = "default_density_min_chars")]
    pub density_min_chars: usize,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for ledgerlens data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            collection_name: default_collection_name(),
            request_timeout_secs: default_request_timeout_secs(),
            conversion: ConversionConfig::default(),
            embedding: EmbeddingConfig::default(),
            reranker: RerankerConfig::default(),
            expansion: ExpansionConfig::default(),
            split: SplitConfig::default(),
            retrieval: RetrievalConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            url: default_conversion_url(),
            instructions: default_conversion_instructions(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            url: default_embedding_url(),
        }
    }
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model: default_reranker_model(),
            url: default_reranker_url(),
        }
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            url: default_expansion_url(),
            model: default_expansion_model(),
            max_expansions: default_max_expansions(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            child_window: default_child_window(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            candidates: default_candidates(),
            expand_queries: default_expand_queries(),
            resolve_parents: default_resolve_parents(),
            density_filter: default_density_filter(),
            density_min_pipes: default_density_min_pipes(),
            density_min_chars: default_density_min_chars(),
        }
    }
}

impl Config {
    /// Get the default base directory for ledgerlens (~/.ledgerlens)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ledgerlens")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory, falling back to
    /// defaults when no file exists yet
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
            config.validate()?;
        } else {
            debug!("No config file found, using defaults");
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Bounded timeout applied to every remote call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.split.child_window == 0 {
            return Err(Error::Config(
                "split.child_window must be positive".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".to_string()));
        }

        if self.retrieval.candidates < self.retrieval.top_k {
            return Err(Error::Config(
                "retrieval.candidates must be >= retrieval.top_k".to_string(),
            ));
        }

        if self.expansion.max_expansions > 4 {
            return Err(Error::Config(
                "expansion.max_expansions must be <= 4".to_string(),
            ));
        }

        if self.embedding.dimension == 0 {
            return Err(Error::Config(
                "embedding.dimension must be positive".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.collection_name, "ledgerlens_filings");
        assert_eq!(config.split.child_window, 500);
        assert_eq!(config.retrieval.top_k, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        config.collection_name = "test_collection".to_string();
        config.retrieval.candidates = 50;

        config.save().unwrap();
        assert!(config.paths.config_file.exists());

        let loaded = Config::load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(loaded.collection_name, "test_collection");
        assert_eq!(loaded.retrieval.candidates, 50);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.retrieval.candidates = config.retrieval.top_k - 1;
        assert!(config.validate().is_err());

        config.retrieval.candidates = 30;
        assert!(config.validate().is_ok());

        config.split.child_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "collection_name = \"only_this\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.collection_name, "only_this");
        assert_eq!(config.retrieval.top_k, default_top_k());
        assert_eq!(config.embedding.dimension, default_embedding_dimension());
    }
}
