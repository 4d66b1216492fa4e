//! Hybrid retriever over a vector index and a metadata store.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use mnemo_memory_sqlite::MetadataStore;
use mnemo_memory_vector::{EmbeddingProvider, VectorIndex, load_snapshot, save_snapshot};
use mnemo_protocols::{RetrievalError, ScopeLabel};

use crate::fusion::{FusionConfig, rrf_fusion};

/// Per-vector metadata written next to `vectors.bin` in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotEntry {
    text: String,
    scope: String,
}

/// Vector plus keyword retrieval over records labelled by `S`.
///
/// Position `p` in the index is always record id `p + 1` in the store.
pub struct HybridRetriever<S: ScopeLabel> {
    index: VectorIndex,
    store: MetadataStore<S>,
    embedder: Arc<dyn EmbeddingProvider>,
    /// Writers hold this exclusively across the index and the store.
    gate: RwLock<()>,
}

impl<S: ScopeLabel> HybridRetriever<S> {
    /// Build a retriever over `store`, rebuilding the index from the stored vectors.
    ///
    /// Fails with [`RetrievalError::CorruptIndex`] if stored ids are not exactly
    /// `1..=n` or a stored vector does not match the embedder's dimension.
    pub async fn open(
        store: MetadataStore<S>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, RetrievalError> {
        let dimension = embedder.dimension();
        let records = store.all_records().await?;

        let mut flat = Vec::with_capacity(records.len() * dimension);
        for (position, record) in records.iter().enumerate() {
            if record.id != position as u64 + 1 {
                return Err(RetrievalError::CorruptIndex(format!(
                    "record id {} found at position {}; ids must be contiguous from 1",
                    record.id, position
                )));
            }
            if record.vector.len() != dimension {
                return Err(RetrievalError::CorruptIndex(format!(
                    "record {} has dimension {}, expected {}",
                    record.id,
                    record.vector.len(),
                    dimension
                )));
            }
            flat.extend_from_slice(&record.vector);
        }

        let index = VectorIndex::from_flat(dimension, flat)?;
        if !index.is_empty() {
            info!("Restored {} vectors into {} index", index.len(), S::TABLE);
        }

        Ok(Self {
            index,
            store,
            embedder,
            gate: RwLock::new(()),
        })
    }

    /// Retriever backed by a fresh in-memory store.
    pub async fn in_memory(embedder: Arc<dyn EmbeddingProvider>) -> Result<Self, RetrievalError> {
        Self::open(MetadataStore::in_memory().await?, embedder).await
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let embedding = self.embedder.embed(text).await?;
        RetrievalError::check_dimension(self.index.dimension(), embedding.vector.len())?;
        Ok(embedding.vector)
    }

    /// Embed and store `text`, returning its record id.
    ///
    /// Either both the vector and the metadata row are committed, or neither is.
    pub async fn add_document(&self, text: &str, scope: &str) -> Result<u64, RetrievalError> {
        if text.is_empty() {
            return Err(RetrievalError::InvalidInput(
                "document text is empty".to_string(),
            ));
        }
        let vector = self.embed(text).await?;

        let _guard = self.gate.write().await;
        let position = self.index.add(&vector)?;
        let id = match self.store.insert(text, &vector, scope).await {
            Ok(id) => id,
            Err(e) => {
                self.index.truncate(position);
                return Err(e);
            }
        };

        if id != position as u64 + 1 {
            self.index.truncate(position);
            self.store.delete(id).await?;
            warn!(
                "{} id {} does not match index position {}",
                S::TABLE,
                id,
                position
            );
            return Err(RetrievalError::CorruptIndex(format!(
                "metadata id {} out of step with index position {}",
                id, position
            )));
        }

        debug!("Added {} record {} (scope {})", S::TABLE, id, scope);
        Ok(id)
    }

    /// Texts of the `k` stored documents nearest to `query`.
    pub async fn vector_search(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        let vector = self.embed(query).await?;
        let _guard = self.gate.read().await;
        self.nearest_texts(&vector, k).await
    }

    /// Like [`vector_search`](Self::vector_search), restricted to records owned by `scope`.
    pub async fn vector_search_in_scope(
        &self,
        query: &str,
        k: usize,
        scope: &str,
    ) -> Result<Vec<String>, RetrievalError> {
        let vector = self.embed(query).await?;
        let _guard = self.gate.read().await;
        if k == 0 {
            return Ok(Vec::new());
        }

        let members: HashSet<u64> = self
            .store
            .list_scope(scope, usize::MAX)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let hits = self.index.search(&vector, self.index.len())?;
        let mut texts = Vec::with_capacity(k.min(members.len()));
        for hit in hits {
            let id = hit.position as u64 + 1;
            if !members.contains(&id) {
                continue;
            }
            if let Some(record) = self.store.get_by_id(id).await? {
                texts.push(record.text);
                if texts.len() == k {
                    break;
                }
            }
        }
        Ok(texts)
    }

    async fn nearest_texts(&self, vector: &[f32], k: usize) -> Result<Vec<String>, RetrievalError> {
        let hits = self.index.search(vector, k)?;
        let mut texts = Vec::with_capacity(hits.len());
        for hit in hits {
            // Positions whose record is gone are skipped.
            if let Some(record) = self.store.get_by_id(hit.position as u64 + 1).await? {
                texts.push(record.text);
            }
        }
        Ok(texts)
    }

    async fn keyword_texts(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        Ok(self
            .store
            .scan_substring(query, k)
            .await?
            .into_iter()
            .map(|r| r.text)
            .collect())
    }

    /// Union of vector and keyword results without duplicates, capped at `k`.
    ///
    /// Vector results come first, then keyword matches not already present.
    pub async fn hybrid_search(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        let vector = self.embed(query).await?;
        let _guard = self.gate.read().await;
        if k == 0 {
            return Ok(Vec::new());
        }

        let semantic = self.nearest_texts(&vector, k).await?;
        let keyword = self.keyword_texts(query, k).await?;

        let mut seen = HashSet::new();
        let merged: Vec<String> = semantic
            .into_iter()
            .chain(keyword)
            .filter(|text| seen.insert(text.clone()))
            .take(k)
            .collect();
        Ok(merged)
    }

    /// Vector and keyword results merged by weighted Reciprocal Rank Fusion.
    pub async fn hybrid_search_ranked(
        &self,
        query: &str,
        k: usize,
        fusion: &FusionConfig,
    ) -> Result<Vec<(String, f32)>, RetrievalError> {
        let vector = self.embed(query).await?;
        let _guard = self.gate.read().await;
        if k == 0 {
            return Ok(Vec::new());
        }

        let semantic = self.nearest_texts(&vector, k).await?;
        let keyword = self.keyword_texts(query, k).await?;

        let mut fused = rrf_fusion(&semantic, &keyword, fusion);
        fused.truncate(k);
        Ok(fused)
    }

    /// Drop every document. The next document gets id 1 at position 0.
    pub async fn clear(&self) -> Result<(), RetrievalError> {
        let _guard = self.gate.write().await;
        self.store.reset().await?;
        self.index.reset();
        info!("Cleared {} retriever", S::TABLE);
        Ok(())
    }

    /// Write the index and its metadata as a snapshot in `dir`.
    pub async fn save_snapshot(&self, dir: &Path) -> Result<usize, RetrievalError> {
        let _guard = self.gate.read().await;
        let entries: Vec<SnapshotEntry> = self
            .store
            .all_records()
            .await?
            .into_iter()
            .map(|r| SnapshotEntry {
                text: r.text,
                scope: r.scope,
            })
            .collect();
        save_snapshot(dir, &self.index, &entries).await?;
        Ok(entries.len())
    }

    /// Load a snapshot from `dir` into this retriever, which must be empty.
    ///
    /// Stored vectors are reused as-is. Returns `Ok(None)` when `dir` holds no snapshot.
    pub async fn import_snapshot(&self, dir: &Path) -> Result<Option<usize>, RetrievalError> {
        let _guard = self.gate.write().await;
        if !self.index.is_empty() {
            return Err(RetrievalError::InvalidInput(format!(
                "cannot import into a non-empty retriever ({} documents)",
                self.index.len()
            )));
        }

        let Some((loaded, entries)) =
            load_snapshot::<SnapshotEntry>(dir, self.index.dimension()).await?
        else {
            return Ok(None);
        };

        let flat = loaded.to_flat();
        let vectors: Vec<&[f32]> = flat.chunks_exact(self.index.dimension()).collect();
        let rows = entries
            .into_iter()
            .zip(&vectors)
            .map(|(entry, vector)| (entry.text, vector.to_vec(), entry.scope))
            .collect();

        self.store.reset().await?;
        let ids = self.store.insert_batch(rows).await?;
        if ids.iter().enumerate().any(|(i, id)| *id != i as u64 + 1) {
            self.store.reset().await?;
            return Err(RetrievalError::CorruptIndex(
                "imported ids are not contiguous from 1".to_string(),
            ));
        }

        for vector in &vectors {
            self.index.add(vector)?;
        }

        info!("Imported {} documents from {:?}", ids.len(), dir);
        Ok(Some(ids.len()))
    }
}

#[cfg(test)]
#[path = "retriever_tests.rs"]
mod tests;
