//! Vector index for mnemo.
//!
//! Exact nearest-neighbour search over fixed-dimension embeddings using squared
//! Euclidean distance. Positions are assigned in insertion order and ties are
//! broken by the lower position, so results are deterministic.

mod embedding;
mod index;
mod snapshot;

pub use embedding::{Embedding, EmbeddingError, EmbeddingProvider, SimpleHashEmbedding};
pub use index::{SearchHit, VectorIndex, l2_squared};
pub use snapshot::{METADATA_FILE, VECTORS_FILE, load_snapshot, save_snapshot};
