//! # mnemo Protocols
//!
//! Types shared by the retrieval and cache crates. Contains no storage logic.
//!
//! - [`Record`] - one stored text unit with its embedding
//! - [`ScopeLabel`] - names the owner column a metadata schema partitions by
//! - [`RetrievalError`] / [`CacheError`] - the error taxonomy surfaced to callers

pub mod error;
pub mod record;
pub mod scope;

pub use error::{CacheError, RetrievalError};
pub use record::Record;
pub use scope::{ConversationId, DocumentSource, ScopeLabel};
