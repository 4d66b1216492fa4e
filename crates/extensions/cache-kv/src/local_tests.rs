use super::*;

const MINUTE: Duration = Duration::from_secs(60);

#[tokio::test]
async fn test_set_and_get() {
    let cache = LocalCacheBackend::new();
    cache.set_ex("k", b"v".to_vec(), MINUTE).await.unwrap();
    assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));
    assert_eq!(cache.get("missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_overwrite_replaces_value() {
    let cache = LocalCacheBackend::new();
    cache.set_ex("k", b"one".to_vec(), MINUTE).await.unwrap();
    cache.set_ex("k", b"two".to_vec(), MINUTE).await.unwrap();
    assert_eq!(cache.get("k").await.unwrap(), Some(b"two".to_vec()));
    assert_eq!(cache.entry_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_zero_ttl_is_already_expired() {
    let cache = LocalCacheBackend::new();
    cache.set_ex("k", b"v".to_vec(), Duration::ZERO).await.unwrap();
    assert_eq!(cache.get("k").await.unwrap(), None);
    assert!(cache.entries.is_empty());
}

#[tokio::test]
async fn test_expired_entry_is_purged_on_read() {
    let cache = LocalCacheBackend::new();
    cache
        .set_ex("k", b"v".to_vec(), Duration::from_millis(20))
        .await
        .unwrap();
    assert!(cache.get("k").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(cache.entry_count().await.unwrap(), 0);
    assert_eq!(cache.entries.len(), 1);
    assert_eq!(cache.get("k").await.unwrap(), None);
    assert_eq!(cache.entries.len(), 0);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let cache = LocalCacheBackend::new();
    cache.set_ex("k", b"v".to_vec(), MINUTE).await.unwrap();
    cache.del("k").await.unwrap();
    cache.del("k").await.unwrap();
    assert_eq!(cache.get("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_flush() {
    let cache = LocalCacheBackend::new();
    for key in ["a", "b", "c"] {
        cache.set_ex(key, vec![1], MINUTE).await.unwrap();
    }
    cache.flush().await.unwrap();
    assert_eq!(cache.entry_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_capacity_evicts_least_recently_used() {
    let cache = LocalCacheBackend::with_capacity(2);
    cache.set_ex("a", vec![1], MINUTE).await.unwrap();
    cache.set_ex("b", vec![2], MINUTE).await.unwrap();

    // Reading "a" makes "b" the eviction candidate.
    cache.get("a").await.unwrap();
    cache.set_ex("c", vec![3], MINUTE).await.unwrap();

    assert_eq!(cache.get("a").await.unwrap(), Some(vec![1]));
    assert_eq!(cache.get("b").await.unwrap(), None);
    assert_eq!(cache.get("c").await.unwrap(), Some(vec![3]));
}

#[tokio::test]
async fn test_capacity_overwrite_does_not_evict() {
    let cache = LocalCacheBackend::with_capacity(2);
    cache.set_ex("a", vec![1], MINUTE).await.unwrap();
    cache.set_ex("b", vec![2], MINUTE).await.unwrap();
    cache.set_ex("a", vec![9], MINUTE).await.unwrap();

    assert_eq!(cache.entry_count().await.unwrap(), 2);
    assert_eq!(cache.get("b").await.unwrap(), Some(vec![2]));
}

#[tokio::test]
async fn test_capacity_prefers_expired_entries() {
    let cache = LocalCacheBackend::with_capacity(2);
    cache.set_ex("stale", vec![0], Duration::ZERO).await.unwrap();
    cache.set_ex("fresh", vec![1], MINUTE).await.unwrap();
    cache.set_ex("new", vec![2], MINUTE).await.unwrap();

    assert_eq!(cache.get("fresh").await.unwrap(), Some(vec![1]));
    assert_eq!(cache.get("new").await.unwrap(), Some(vec![2]));
}

#[test]
fn test_capacity_minimum() {
    assert_eq!(LocalCacheBackend::with_capacity(0).capacity(), Some(1));
    assert_eq!(LocalCacheBackend::new().capacity(), None);
}

#[test]
fn test_backend_identity() {
    let cache = LocalCacheBackend::default();
    assert_eq!(cache.name(), "local");
    assert!(!cache.is_durable());
}
