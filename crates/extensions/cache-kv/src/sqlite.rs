//! SQLite cache backend shared across processes through a database file.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{OptionalExtension, params};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use mnemo_protocols::CacheError;

use crate::backend::CacheBackend;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS cache_entries (
        key TEXT PRIMARY KEY,
        value BLOB NOT NULL,
        expires_at INTEGER NOT NULL
    );
"#;

fn unavailable(e: impl std::fmt::Display) -> CacheError {
    CacheError::BackendUnavailable(e.to_string())
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Durable cache backend. Expiry is stored as unix milliseconds and checked on read.
pub struct SqliteCacheBackend {
    conn: Connection,
}

impl SqliteCacheBackend {
    /// Open (or create) the cache database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).await.map_err(unavailable)?;
        conn.call(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(unavailable)?;

        info!("Opened SQLite cache at {:?}", path);
        Ok(Self { conn })
    }

    /// Open a private in-memory database.
    pub async fn in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory().await.map_err(unavailable)?;
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(unavailable)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for SqliteCacheBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn is_durable(&self) -> bool {
        true
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.conn
            .call(|conn| {
                conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| {
                    row.get::<_, i64>(0)
                })?;
                Ok(())
            })
            .await
            .map_err(unavailable)
    }

    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let key = key.to_string();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        self.conn
            .call(move |conn| {
                let expires_at = now_millis().saturating_add(ttl_ms);
                conn.execute(
                    r#"
                    INSERT INTO cache_entries (key, value, expires_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        expires_at = excluded.expires_at
                    "#,
                    params![key, value, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(unavailable)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                let row: Option<(Vec<u8>, i64)> = conn
                    .query_row(
                        "SELECT value, expires_at FROM cache_entries WHERE key = ?1",
                        [&key],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;

                match row {
                    Some((value, expires_at)) if now_millis() < expires_at => Ok(Some(value)),
                    Some(_) => {
                        conn.execute(
                            "DELETE FROM cache_entries WHERE key = ?1 AND expires_at <= ?2",
                            params![key, now_millis()],
                        )?;
                        debug!("Purged expired cache key {}", key);
                        Ok(None)
                    }
                    None => Ok(None),
                }
            })
            .await
            .map_err(unavailable)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM cache_entries WHERE key = ?1", [key])?;
                Ok(())
            })
            .await
            .map_err(unavailable)
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.conn
            .call(|conn| {
                conn.execute("DELETE FROM cache_entries", [])?;
                Ok(())
            })
            .await
            .map_err(unavailable)
    }

    async fn entry_count(&self) -> Result<usize, CacheError> {
        let count: i64 = self
            .conn
            .call(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE expires_at > ?1",
                    [now_millis()],
                    |row| row.get(0),
                )?)
            })
            .await
            .map_err(unavailable)?;
        Ok(count as usize)
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
