//! Configuration validation.

use url::Url;

use crate::error::ConfigError;
use crate::schema::Config;

const SCOPE_KINDS: [&str; 2] = ["document", "conversation"];
const PROVIDERS: [&str; 2] = ["hash", "http"];
const LARGE_DIMENSION: usize = 8192;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error, if any, into a [`ConfigError::InvalidValue`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_retrieval(config, &mut result);
        Self::validate_embedding(config, &mut result);
        Self::validate_cache(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_retrieval(config: &Config, result: &mut ValidationResult) {
        let retrieval = &config.retrieval;

        if retrieval.dimension == 0 {
            result.add_error(ValidationError::new(
                "retrieval.dimension",
                "dimension must be greater than 0",
            ));
        } else if retrieval.dimension > LARGE_DIMENSION {
            result.add_warning(ValidationWarning::new(
                "retrieval.dimension",
                format!(
                    "dimension is very high (>{}), every search scans all vectors",
                    LARGE_DIMENSION
                ),
            ));
        }

        if retrieval.default_top_k == 0 {
            result.add_error(ValidationError::new(
                "retrieval.default_top_k",
                "default_top_k must be greater than 0",
            ));
        }

        if !SCOPE_KINDS.contains(&retrieval.scope_kind.as_str()) {
            result.add_error(ValidationError::new(
                "retrieval.scope_kind",
                format!(
                    "Unknown scope kind '{}', valid values: {:?}",
                    retrieval.scope_kind, SCOPE_KINDS
                ),
            ));
        }

        if retrieval.metadata_path.as_os_str().is_empty() {
            result.add_error(ValidationError::new(
                "retrieval.metadata_path",
                "metadata_path cannot be empty",
            ));
        }
    }

    fn validate_embedding(config: &Config, result: &mut ValidationResult) {
        let embedding = &config.embedding;

        if !PROVIDERS.contains(&embedding.provider.as_str()) {
            result.add_error(ValidationError::new(
                "embedding.provider",
                format!(
                    "Unknown embedding provider '{}', valid values: {:?}",
                    embedding.provider, PROVIDERS
                ),
            ));
            return;
        }

        if embedding.provider != "http" {
            return;
        }

        match &embedding.base_url {
            None => result.add_error(ValidationError::new(
                "embedding.base_url",
                "base_url is required for the http provider",
            )),
            Some(url) => {
                let valid = Url::parse(url)
                    .map(|u| u.scheme() == "http" || u.scheme() == "https")
                    .unwrap_or(false);
                if !valid {
                    result.add_error(ValidationError::new(
                        "embedding.base_url",
                        "base_url must be an http:// or https:// URL",
                    ));
                }
            }
        }

        if embedding.api_key.is_none() {
            result.add_warning(ValidationWarning::new(
                "embedding.api_key",
                "API key is not set, requests will be sent without authorization",
            ));
        }
    }

    fn validate_cache(config: &Config, result: &mut ValidationResult) {
        let cache = &config.cache;

        if cache.default_ttl_secs == 0 {
            result.add_error(ValidationError::new(
                "cache.default_ttl_secs",
                "default_ttl_secs must be greater than 0",
            ));
        }

        if cache.capacity == Some(0) {
            result.add_error(ValidationError::new(
                "cache.capacity",
                "capacity must be greater than 0",
            ));
        }

        if let Some(url) = &cache.url {
            let problem = match Url::parse(url) {
                Ok(parsed) => match parsed.scheme() {
                    "redis" if parsed.host_str().is_none_or(str::is_empty) => Some(
                        "redis cache url needs a host, e.g. redis://localhost:6379/0".to_string(),
                    ),
                    "sqlite" if url.trim_start_matches("sqlite://").is_empty() => Some(
                        "sqlite cache url needs a path, e.g. sqlite:///var/lib/mnemo/cache.db"
                            .to_string(),
                    ),
                    "redis" | "sqlite" => None,
                    other => Some(format!("Unsupported cache backend '{}'", other)),
                },
                Err(e) => Some(format!("Malformed cache url: {}", e)),
            };

            match problem {
                Some(message) => result.add_error(ValidationError::new("cache.url", message)),
                None if !cache.fallback => result.add_warning(ValidationWarning::new(
                    "cache.fallback",
                    "fallback is disabled, startup fails if the cache backend is unreachable",
                )),
                None => {}
            }
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "level cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
