//! Scope labels for metadata schemas.
//!
//! A retriever over documents tags each record with its `source`; a retriever over
//! conversation turns tags it with a `conversation_id`. Both share one implementation
//! parameterised by this trait.

/// Names the table and owner column of a metadata schema.
///
/// Both names are interpolated into SQL and must be plain identifiers.
pub trait ScopeLabel: Send + Sync + 'static {
    /// Table holding the records.
    const TABLE: &'static str;
    /// Column holding the owner identifier.
    const COLUMN: &'static str;
}

/// Documents tagged by their source.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentSource;

impl ScopeLabel for DocumentSource {
    const TABLE: &'static str = "documents";
    const COLUMN: &'static str = "source";
}

/// Conversation turns tagged by conversation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversationId;

impl ScopeLabel for ConversationId {
    const TABLE: &'static str = "memory";
    const COLUMN: &'static str = "conversation_id";
}
