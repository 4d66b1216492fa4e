//! Error types for the mnemo core components.

mod cache;
mod retrieval;

pub use cache::*;
pub use retrieval::*;
