use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Content file extension used when none is configured.
pub const DEFAULT_EXTENSION: &str = "org";

/// Top-level configuration for the index engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub content: ContentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Corpus layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Root directory of the document corpus
    pub root: PathBuf,
    /// Content file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Whether to descend into subdirectories
    #[serde(default = "default_true")]
    pub recursive: bool,
}

/// Persistent cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Snapshot location, relative to the working directory unless absolute
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

/// Logging and telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether to log index statistics after a build
    #[serde(default = "default_true")]
    pub show_index_stats: bool,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(".rhizome/backlinks.json")
}

fn default_true() -> bool {
    true
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content: ContentConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("content"),
            extension: default_extension(),
            recursive: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_cache_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            show_index_stats: true,
        }
    }
}

impl SiteConfig {
    /// Load config from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
