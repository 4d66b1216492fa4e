//! Flat vector index for exact similarity search.

use std::cmp::Ordering;

use parking_lot::RwLock;

use mnemo_protocols::RetrievalError;

/// Search hit from the index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Zero-based insertion position.
    pub position: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// In-memory vector index using brute-force L2 search.
///
/// Vectors are stored contiguously; the vector at position `p` occupies
/// `data[p * dimension..(p + 1) * dimension]`.
pub struct VectorIndex {
    dimension: usize,
    data: RwLock<Vec<f32>>,
}

impl VectorIndex {
    /// Create an empty index for vectors of `dimension` floats.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Build an index from a flat, row-major vector array.
    pub fn from_flat(dimension: usize, data: Vec<f32>) -> Result<Self, RetrievalError> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(RetrievalError::CorruptIndex(format!(
                "{} floats do not divide into vectors of dimension {}",
                data.len(),
                dimension
            )));
        }
        Ok(Self {
            dimension,
            data: RwLock::new(data),
        })
    }

    /// Dimension every stored vector has.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Append a vector, returning its position.
    pub fn add(&self, vector: &[f32]) -> Result<usize, RetrievalError> {
        RetrievalError::check_dimension(self.dimension, vector.len())?;
        let mut data = self.data.write();
        let position = data.len() / self.dimension;
        data.extend_from_slice(vector);
        Ok(position)
    }

    /// Copy of the vector stored at `position`.
    pub fn get(&self, position: usize) -> Option<Vec<f32>> {
        let data = self.data.read();
        let start = position.checked_mul(self.dimension)?;
        data.get(start..start + self.dimension).map(<[f32]>::to_vec)
    }

    /// Return up to `k` positions ordered by ascending distance to `query`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, RetrievalError> {
        RetrievalError::check_dimension(self.dimension, query.len())?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let data = self.data.read();
        let mut hits: Vec<SearchHit> = data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, vector)| SearchHit {
                position,
                distance: l2_squared(query, vector),
            })
            .collect();
        drop(data);

        if hits.len() > k {
            hits.select_nth_unstable_by(k, compare_hits);
            hits.truncate(k);
        }
        hits.sort_by(compare_hits);
        Ok(hits)
    }

    /// Drop every vector at or after position `len`.
    pub fn truncate(&self, len: usize) {
        self.data.write().truncate(len * self.dimension);
    }

    /// Drop all vectors. Positions restart at 0.
    pub fn reset(&self) {
        self.data.write().clear();
    }

    /// Copy of the flat, row-major vector array.
    pub fn to_flat(&self) -> Vec<f32> {
        self.data.read().clone()
    }

    /// Get the number of vectors in the index.
    pub fn len(&self) -> usize {
        self.data.read().len() / self.dimension.max(1)
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.position.cmp(&b.position))
}

/// Squared Euclidean distance between two equal-length vectors.
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
