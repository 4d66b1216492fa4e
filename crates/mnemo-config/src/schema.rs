//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Base directory for mnemo state (`~/.mnemo`).
pub fn mnemo_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mnemo")
}

/// Retrieval engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Embedding dimension shared by the index and the embedding provider.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    #[serde(default = "default_metadata_path")]
    pub metadata_path: PathBuf,

    /// `document` (records keyed by source) or `conversation` (keyed by conversation id).
    #[serde(default = "default_scope_kind")]
    pub scope_kind: String,

    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            metadata_path: default_metadata_path(),
            scope_kind: default_scope_kind(),
            default_top_k: default_top_k(),
            snapshot_dir: None,
        }
    }
}

fn default_dimension() -> usize {
    384
}

fn default_metadata_path() -> PathBuf {
    mnemo_dir().join("metadata.db")
}

fn default_scope_kind() -> String {
    "document".to_string()
}

fn default_top_k() -> usize {
    5
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// `hash` (local feature hashing) or `http` (OpenAI-compatible endpoint).
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            model: None,
            api_key: None,
        }
    }
}

fn default_provider() -> String {
    "hash".to_string()
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Durable backend connection string, e.g. `redis://localhost:6379/0` or
    /// `sqlite:///var/lib/mnemo/cache.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Use a process-local cache when the durable backend is unreachable at startup.
    #[serde(default = "default_true")]
    pub fallback: bool,

    /// Key limit for the local cache (LRU eviction).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            default_ttl_secs: default_ttl_secs(),
            fallback: true,
            capacity: None,
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for daily rolling log files. Console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Write file logs as JSON lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
