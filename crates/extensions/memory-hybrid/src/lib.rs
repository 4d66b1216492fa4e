//! Hybrid retrieval for mnemo.
//!
//! Pairs an exact [`VectorIndex`](mnemo_memory_vector::VectorIndex) with a SQLite
//! [`MetadataStore`](mnemo_memory_sqlite::MetadataStore) and answers queries from
//! both:
//!
//! - **Vector search**: nearest stored embeddings by squared L2 distance
//! - **Keyword search**: case-sensitive substring scan over stored text
//! - **Fusion**: plain ordered union, or weighted Reciprocal Rank Fusion (RRF)
//!
//! Index position `i` always refers to metadata record `i + 1`. Writers are
//! serialized so the two stores never drift apart.

mod embedding;
mod fusion;
mod retriever;

pub use embedding::{HttpEmbedding, HttpEmbeddingConfig};
pub use fusion::{FusionConfig, rrf_fusion};
pub use retriever::HybridRetriever;
