//! Cache errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
