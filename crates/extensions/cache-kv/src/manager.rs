//! Cache manager: backend selection and typed access.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use mnemo_protocols::CacheError;

use crate::backend::CacheBackend;
use crate::local::LocalCacheBackend;
use crate::redis_backend::RedisCacheBackend;
use crate::sqlite::SqliteCacheBackend;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// How long the startup connection to a network backend may take.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

const REDIS_SCHEME: &str = "redis://";
const SQLITE_SCHEME: &str = "sqlite://";

/// How a [`CacheManager`] picks and configures its backend.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Durable backend connection string (`redis://host:port/db` or `sqlite://<path>`).
    /// `None` means local only.
    pub url: Option<String>,
    pub default_ttl: Duration,
    /// Fall back to the local backend when the durable one is unreachable.
    pub fallback: bool,
    /// Key limit for the local backend.
    pub capacity: Option<usize>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            url: None,
            default_ttl: DEFAULT_TTL,
            fallback: true,
            capacity: None,
        }
    }
}

impl CacheOptions {
    fn local_backend(&self) -> Arc<dyn CacheBackend> {
        match self.capacity {
            Some(capacity) => Arc::new(LocalCacheBackend::with_capacity(capacity)),
            None => Arc::new(LocalCacheBackend::new()),
        }
    }
}

async fn open_durable(url: &str) -> Result<Arc<dyn CacheBackend>, CacheError> {
    if url.starts_with(REDIS_SCHEME) {
        return Ok(Arc::new(RedisCacheBackend::connect(url, CONNECT_TIMEOUT).await?));
    }

    let path = url.strip_prefix(SQLITE_SCHEME).ok_or_else(|| {
        CacheError::BackendUnavailable(format!("unsupported cache url: {}", url))
    })?;
    if path.is_empty() {
        return Err(CacheError::BackendUnavailable(format!(
            "cache url has no path: {}",
            url
        )));
    }
    Ok(Arc::new(SqliteCacheBackend::open(path).await?))
}

/// Key-value cache with per-entry TTL.
///
/// The backend is chosen once, at construction; there is no later re-promotion
/// from the local fallback to the durable backend.
pub struct CacheManager {
    backend: Arc<dyn CacheBackend>,
    default_ttl: Duration,
}

impl CacheManager {
    /// Connect to the backend described by `options`.
    pub async fn connect(options: &CacheOptions) -> Result<Self, CacheError> {
        let Some(url) = &options.url else {
            info!("No durable cache configured, using local cache");
            return Ok(Self::with_backend(options.local_backend(), options.default_ttl));
        };

        match open_durable(url).await {
            Ok(durable) => Self::with_probe(durable, options).await,
            Err(e) => Self::fall_back(e, options),
        }
    }

    /// Probe `durable` once and use it, or the local fallback if the probe fails.
    pub async fn with_probe(
        durable: Arc<dyn CacheBackend>,
        options: &CacheOptions,
    ) -> Result<Self, CacheError> {
        match durable.ping().await {
            Ok(()) => {
                info!("Cache connected to {} backend", durable.name());
                Ok(Self::with_backend(durable, options.default_ttl))
            }
            Err(e) => Self::fall_back(e, options),
        }
    }

    fn fall_back(error: CacheError, options: &CacheOptions) -> Result<Self, CacheError> {
        if !options.fallback {
            return Err(error);
        }
        warn!("Durable cache unavailable ({}), falling back to local cache", error);
        Ok(Self::with_backend(options.local_backend(), options.default_ttl))
    }

    /// Use `backend` as-is, without probing.
    pub fn with_backend(backend: Arc<dyn CacheBackend>, default_ttl: Duration) -> Self {
        Self {
            backend,
            default_ttl,
        }
    }

    /// Unbounded local cache with the default TTL.
    pub fn local() -> Self {
        Self::with_backend(Arc::new(LocalCacheBackend::new()), DEFAULT_TTL)
    }

    pub fn is_durable(&self) -> bool {
        self.backend.is_durable()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Serialize `value` as MessagePack and store it under `key` for `ttl` (default TTL
    /// if `None`). Anything `Serialize` round-trips, including non-string map keys and NaN.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let payload = rmp_serde::to_vec_named(value)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set_bytes(key, payload, ttl).await
    }

    /// Live value for `key`, deserialized as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_bytes(key).await? {
            Some(payload) => rmp_serde::from_slice(&payload)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    pub async fn set_bytes(
        &self,
        key: &str,
        payload: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        debug!("Cache set {} ({} bytes, ttl {:?})", key, payload.len(), ttl);
        self.backend.set_ex(key, payload, ttl).await
    }

    pub async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let payload = self.backend.get(key).await?;
        debug!("Cache {} for {}", if payload.is_some() { "hit" } else { "miss" }, key);
        Ok(payload)
    }

    /// Remove `key`; absent keys are fine.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.backend.del(key).await
    }

    /// Remove every key.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.backend.flush().await
    }

    /// Number of live entries. Expired entries not yet purged by a read are excluded.
    pub async fn entry_count(&self) -> Result<usize, CacheError> {
        self.backend.entry_count().await
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
