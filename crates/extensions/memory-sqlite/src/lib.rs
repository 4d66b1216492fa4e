//! SQLite metadata store for mnemo.
//!
//! Maps monotonically increasing record ids to `(text, vector, scope)` rows. The id
//! sequence is an `AUTOINCREMENT` primary key, so ids are never reused unless the
//! store is explicitly [`reset`](MetadataStore::reset).

mod schema;
mod store;

pub use store::MetadataStore;
