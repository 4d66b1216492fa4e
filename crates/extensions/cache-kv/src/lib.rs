//! Key-value cache with expiration for mnemo.
//!
//! [`CacheManager`] serializes values as MessagePack (`rmp-serde`) and stores them in a
//! [`CacheBackend`]. At construction it probes the configured durable backend once;
//! if the probe fails it falls back to a process-local map for the rest of its life.
//!
//! Expired entries are purged lazily, when a read finds them.

mod backend;
mod local;
mod manager;
mod redis_backend;
mod sqlite;

pub use backend::CacheBackend;
pub use local::LocalCacheBackend;
pub use manager::{CacheManager, CacheOptions, DEFAULT_TTL};
pub use redis_backend::RedisCacheBackend;
pub use sqlite::SqliteCacheBackend;
