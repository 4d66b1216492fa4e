use super::*;
use tempfile::TempDir;

fn sample_index() -> (VectorIndex, Vec<String>) {
    let index = VectorIndex::new(2);
    index.add(&[1.0, 0.0]).unwrap();
    index.add(&[0.0, 1.0]).unwrap();
    (index, vec!["first".to_string(), "second".to_string()])
}

#[tokio::test]
async fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let (index, metadata) = sample_index();

    save_snapshot(dir.path(), &index, &metadata).await.unwrap();
    let (loaded, loaded_meta) = load_snapshot::<String>(dir.path(), 2)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.to_flat(), index.to_flat());
    assert_eq!(loaded_meta, metadata);

    let hits = loaded.search(&[0.0, 1.0], 1).unwrap();
    assert_eq!(hits[0].position, 1);
}

#[tokio::test]
async fn test_load_missing_snapshot() {
    let dir = TempDir::new().unwrap();
    let loaded = load_snapshot::<String>(dir.path(), 2).await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_load_incomplete_snapshot() {
    let dir = TempDir::new().unwrap();
    let (index, metadata) = sample_index();
    save_snapshot(dir.path(), &index, &metadata).await.unwrap();
    std::fs::remove_file(dir.path().join(METADATA_FILE)).unwrap();

    let result = load_snapshot::<String>(dir.path(), 2).await;
    assert!(matches!(result, Err(RetrievalError::CorruptIndex(_))));
}

#[tokio::test]
async fn test_load_dimension_mismatch() {
    let dir = TempDir::new().unwrap();
    let (index, metadata) = sample_index();
    save_snapshot(dir.path(), &index, &metadata).await.unwrap();

    let result = load_snapshot::<String>(dir.path(), 384).await;
    match result {
        Err(RetrievalError::CorruptIndex(msg)) => assert!(msg.contains("384")),
        other => panic!("expected CorruptIndex, got {:?}", other.map(|o| o.is_some())),
    }
}

#[tokio::test]
async fn test_load_truncated_vectors() {
    let dir = TempDir::new().unwrap();
    let (index, metadata) = sample_index();
    save_snapshot(dir.path(), &index, &metadata).await.unwrap();

    let path = dir.path().join(VECTORS_FILE);
    let raw = std::fs::read(&path).unwrap();
    std::fs::write(&path, &raw[..raw.len() - 4]).unwrap();

    let result = load_snapshot::<String>(dir.path(), 2).await;
    assert!(matches!(result, Err(RetrievalError::CorruptIndex(_))));
}

#[tokio::test]
async fn test_load_bad_magic() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(VECTORS_FILE), b"not a snapshot file").unwrap();
    std::fs::write(dir.path().join(METADATA_FILE), b"[]").unwrap();

    let result = load_snapshot::<String>(dir.path(), 2).await;
    assert!(matches!(result, Err(RetrievalError::CorruptIndex(_))));
}

#[tokio::test]
async fn test_load_metadata_count_mismatch() {
    let dir = TempDir::new().unwrap();
    let (index, metadata) = sample_index();
    save_snapshot(dir.path(), &index, &metadata).await.unwrap();
    std::fs::write(dir.path().join(METADATA_FILE), br#"["only one"]"#).unwrap();

    let result = load_snapshot::<String>(dir.path(), 2).await;
    assert!(matches!(result, Err(RetrievalError::CorruptIndex(_))));
}

#[tokio::test]
async fn test_save_rejects_mismatched_metadata() {
    let dir = TempDir::new().unwrap();
    let (index, _) = sample_index();

    let result = save_snapshot(dir.path(), &index, &["one".to_string()]).await;
    assert!(matches!(result, Err(RetrievalError::CorruptIndex(_))));
    assert!(!dir.path().join(VECTORS_FILE).exists());
}

#[tokio::test]
async fn test_save_empty_index() {
    let dir = TempDir::new().unwrap();
    let index = VectorIndex::new(4);
    save_snapshot::<String>(dir.path(), &index, &[]).await.unwrap();

    let (loaded, meta) = load_snapshot::<String>(dir.path(), 4).await.unwrap().unwrap();
    assert!(loaded.is_empty());
    assert!(meta.is_empty());
}
