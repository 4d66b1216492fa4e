//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tracing::{debug, info};

use mnemo_protocols::CacheError;

use crate::backend::CacheBackend;

fn unavailable(e: impl std::fmt::Display) -> CacheError {
    CacheError::BackendUnavailable(e.to_string())
}

/// Durable cache backend on a Redis server.
///
/// Expiry is delegated to Redis (`SET .. PX`). The connection manager reconnects on its
/// own after the server drops the connection.
#[derive(Clone)]
pub struct RedisCacheBackend {
    conn: ConnectionManager,
}

impl RedisCacheBackend {
    /// Connect to `url` (`redis://host:port/db`), giving up after `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(timeout)
            .set_response_timeout(timeout);

        let connecting = ConnectionManager::new_with_config(client, config);
        let conn = tokio::time::timeout(timeout, connecting)
            .await
            .map_err(|_| unavailable(format!("connecting to {} timed out", url)))?
            .map_err(unavailable)?;

        info!("Connected to Redis cache at {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn is_durable(&self) -> bool {
        true
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        // Redis rejects a zero expiry; an entry that is already expired is an absent one.
        if ttl_ms == 0 {
            debug!("Zero TTL for cache key {}, removing it", key);
            return self.del(key).await;
        }

        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn entry_count(&self) -> Result<usize, CacheError> {
        let mut conn = self.conn.clone();
        let count: u64 = redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(count as usize)
    }
}

#[cfg(test)]
#[path = "redis_backend_tests.rs"]
mod tests;
