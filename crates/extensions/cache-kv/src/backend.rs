//! Cache backend trait.

use std::time::Duration;

use async_trait::async_trait;

use mnemo_protocols::CacheError;

/// Storage for opaque cache payloads.
///
/// Implementations must treat an entry whose TTL has elapsed as absent and remove it
/// on the read that notices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether entries outlive this process.
    fn is_durable(&self) -> bool;

    /// Connectivity check.
    async fn ping(&self) -> Result<(), CacheError>;

    /// Store `value` under `key`, replacing any previous entry, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Live payload for `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Remove `key`. Absent keys are not an error.
    async fn del(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key.
    async fn flush(&self) -> Result<(), CacheError>;

    /// Number of live entries.
    async fn entry_count(&self) -> Result<usize, CacheError>;
}
