//! Configuration loader.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound(path.display().to_string()),
            _ => ConfigError::Io(e),
        })?;
        Self::load_str(&content)
    }

    /// Load from `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Self::finish(Config::default())),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(Self::finish(config))
    }

    fn finish(mut config: Config) -> Config {
        config.retrieval.metadata_path = Self::expand_pathbuf(&config.retrieval.metadata_path);
        config.retrieval.snapshot_dir = config
            .retrieval
            .snapshot_dir
            .as_deref()
            .map(Self::expand_pathbuf);
        config.logging.dir = config.logging.dir.as_deref().map(Self::expand_pathbuf);
        config
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]*)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            if var_name.is_empty() {
                return Err(ConfigError::InvalidFormat(
                    "empty environment variable reference `${}`".to_string(),
                ));
            }
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.mnemo`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }

    fn expand_pathbuf(path: &Path) -> PathBuf {
        match path.to_str() {
            Some(s) => PathBuf::from(Self::expand_path(s)),
            None => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
