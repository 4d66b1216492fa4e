//! Process-local cache backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use mnemo_protocols::CacheError;

use crate::backend::CacheBackend;

struct LocalEntry {
    value: Vec<u8>,
    expires_at: Instant,
    last_used: u64,
}

impl LocalEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory cache, optionally bounded with least-recently-used eviction.
pub struct LocalCacheBackend {
    entries: DashMap<String, LocalEntry>,
    capacity: Option<usize>,
    clock: AtomicU64,
    /// Serializes inserts of new keys while bounded.
    admission: Mutex<()>,
}

impl LocalCacheBackend {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            capacity: None,
            clock: AtomicU64::new(0),
            admission: Mutex::new(()),
        }
    }

    /// Bounded cache holding at most `capacity` keys (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::new()
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn expiry(ttl: Duration) -> Instant {
        let now = Instant::now();
        now.checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(u32::MAX as u64))
    }

    /// Make room for one new key.
    fn admit(&self, capacity: usize) {
        if self.entries.len() < capacity {
            return;
        }

        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        if self.entries.len() < capacity {
            return;
        }

        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.last_used)
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            self.entries.remove(&key);
            debug!("Evicted least recently used cache key {}", key);
        }
    }
}

impl Default for LocalCacheBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for LocalCacheBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn is_durable(&self) -> bool {
        false
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let entry = LocalEntry {
            value,
            expires_at: Self::expiry(ttl),
            last_used: self.tick(),
        };

        match self.capacity {
            Some(capacity) => {
                let _admission = self.admission.lock();
                if !self.entries.contains_key(key) {
                    self.admit(capacity);
                }
                self.entries.insert(key.to_string(), entry);
            }
            None => {
                self.entries.insert(key.to_string(), entry);
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        if let Some(mut entry) = self.entries.get_mut(key) {
            if !entry.is_expired(now) {
                entry.last_used = self.tick();
                return Ok(Some(entry.value.clone()));
            }
        }

        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some()
        {
            debug!("Purged expired cache key {}", key);
        }
        Ok(None)
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }

    async fn entry_count(&self) -> Result<usize, CacheError> {
        let now = Instant::now();
        Ok(self
            .entries
            .iter()
            .filter(|entry| !entry.is_expired(now))
            .count())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
