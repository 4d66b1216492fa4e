//! On-disk snapshots of a vector index.
//!
//! A snapshot is a file pair inside one directory:
//!
//! ```text
//! {dir}/
//! ├── vectors.bin     "MNVI" | u32 dimension | u64 count | count * dimension f32 (all LE)
//! └── metadata.json   JSON array with one element per vector, in position order
//! ```

use std::path::Path;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, info};

use mnemo_protocols::RetrievalError;

use crate::index::VectorIndex;

pub const VECTORS_FILE: &str = "vectors.bin";
pub const METADATA_FILE: &str = "metadata.json";

const MAGIC: &[u8; 4] = b"MNVI";
const HEADER_LEN: usize = 16;

fn io_error(action: &str, path: &Path, e: std::io::Error) -> RetrievalError {
    RetrievalError::BackendUnavailable(format!("{} {:?}: {}", action, path, e))
}

/// Write `index` and its parallel `metadata` into `dir`.
///
/// Each file is written to a temporary name and renamed into place.
pub async fn save_snapshot<M: Serialize>(
    dir: &Path,
    index: &VectorIndex,
    metadata: &[M],
) -> Result<(), RetrievalError> {
    let flat = index.to_flat();
    let dimension = index.dimension();
    let count = flat.len() / dimension.max(1);
    if metadata.len() != count {
        return Err(RetrievalError::CorruptIndex(format!(
            "{} metadata entries for {} vectors",
            metadata.len(),
            count
        )));
    }

    let mut buf = BytesMut::with_capacity(HEADER_LEN + flat.len() * 4);
    buf.put_slice(MAGIC);
    buf.put_u32_le(dimension as u32);
    buf.put_u64_le(count as u64);
    for v in &flat {
        buf.put_f32_le(*v);
    }

    let json = serde_json::to_vec(metadata)
        .map_err(|e| RetrievalError::CorruptIndex(format!("metadata encode failed: {}", e)))?;

    fs::create_dir_all(dir)
        .await
        .map_err(|e| io_error("create", dir, e))?;
    write_atomic(&dir.join(VECTORS_FILE), &buf).await?;
    write_atomic(&dir.join(METADATA_FILE), &json).await?;

    info!("Saved index snapshot with {} vectors to {:?}", count, dir);
    Ok(())
}

async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), RetrievalError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)
        .await
        .map_err(|e| io_error("write", &tmp, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| io_error("rename", path, e))
}

/// Load a snapshot written by [`save_snapshot`].
///
/// Returns `Ok(None)` when neither file exists. Any other inconsistency, including a
/// dimension different from `dimension`, is a [`RetrievalError::CorruptIndex`].
pub async fn load_snapshot<M: DeserializeOwned>(
    dir: &Path,
    dimension: usize,
) -> Result<Option<(VectorIndex, Vec<M>)>, RetrievalError> {
    let vectors_path = dir.join(VECTORS_FILE);
    let metadata_path = dir.join(METADATA_FILE);

    let has_vectors = fs::try_exists(&vectors_path).await.unwrap_or(false);
    let has_metadata = fs::try_exists(&metadata_path).await.unwrap_or(false);
    match (has_vectors, has_metadata) {
        (false, false) => {
            debug!("No snapshot found in {:?}", dir);
            return Ok(None);
        }
        (true, false) | (false, true) => {
            return Err(RetrievalError::CorruptIndex(format!(
                "incomplete snapshot in {:?}: expected both {} and {}",
                dir, VECTORS_FILE, METADATA_FILE
            )));
        }
        (true, true) => {}
    }

    let raw = fs::read(&vectors_path)
        .await
        .map_err(|e| RetrievalError::CorruptIndex(format!("read {:?}: {}", vectors_path, e)))?;
    let index = decode_vectors(&raw, dimension)?;

    let json = fs::read(&metadata_path)
        .await
        .map_err(|e| RetrievalError::CorruptIndex(format!("read {:?}: {}", metadata_path, e)))?;
    let metadata: Vec<M> = serde_json::from_slice(&json)
        .map_err(|e| RetrievalError::CorruptIndex(format!("metadata decode failed: {}", e)))?;

    if metadata.len() != index.len() {
        return Err(RetrievalError::CorruptIndex(format!(
            "{} metadata entries for {} vectors",
            metadata.len(),
            index.len()
        )));
    }

    info!("Loaded index snapshot with {} vectors from {:?}", index.len(), dir);
    Ok(Some((index, metadata)))
}

fn decode_vectors(raw: &[u8], dimension: usize) -> Result<VectorIndex, RetrievalError> {
    if raw.len() < HEADER_LEN || &raw[..4] != MAGIC {
        return Err(RetrievalError::CorruptIndex(
            "vector file has no valid header".to_string(),
        ));
    }

    let mut buf = &raw[4..];
    let stored_dimension = buf.get_u32_le() as usize;
    let count = buf.get_u64_le() as usize;

    if stored_dimension != dimension {
        return Err(RetrievalError::CorruptIndex(format!(
            "snapshot dimension {} does not match configured dimension {}",
            stored_dimension, dimension
        )));
    }

    let expected = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| RetrievalError::CorruptIndex("vector count overflows".to_string()))?;
    if buf.remaining() != expected {
        return Err(RetrievalError::CorruptIndex(format!(
            "expected {} payload bytes for {} vectors, found {}",
            expected,
            count,
            buf.remaining()
        )));
    }

    let mut flat = Vec::with_capacity(count * dimension);
    while buf.has_remaining() {
        flat.push(buf.get_f32_le());
    }
    VectorIndex::from_flat(dimension, flat)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
