//! Stored record type.

use serde::{Deserialize, Serialize};

/// One stored text unit.
///
/// `id` is assigned by the metadata store on insert and is never reused while the
/// id sequence is live. `vector` is the embedding taken at insertion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub text: String,
    pub vector: Vec<f32>,
    pub scope: String,
}

impl Record {
    /// Zero-based index position this record is bound to.
    pub fn position(&self) -> usize {
        (self.id - 1) as usize
    }
}

/// Encode a vector as little-endian f32 bytes.
pub fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode little-endian f32 bytes. Returns `None` if the length is not a multiple of 4.
pub fn vector_from_bytes(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
