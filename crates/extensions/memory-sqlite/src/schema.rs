//! Database schema management.

use rusqlite::Connection;
use tokio_rusqlite::Error;

use mnemo_protocols::ScopeLabel;

pub(crate) fn create_sql<S: ScopeLabel>() -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            vector BLOB NOT NULL,
            {column} TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column});
        "#,
        table = S::TABLE,
        column = S::COLUMN,
    )
}

pub(crate) fn insert_sql<S: ScopeLabel>() -> String {
    format!(
        "INSERT INTO {} (text, vector, {}) VALUES (?1, ?2, ?3)",
        S::TABLE,
        S::COLUMN
    )
}

fn select_sql<S: ScopeLabel>() -> String {
    format!("SELECT id, text, vector, {} FROM {}", S::COLUMN, S::TABLE)
}

pub(crate) fn by_id_sql<S: ScopeLabel>() -> String {
    format!("{} WHERE id = ?1", select_sql::<S>())
}

/// `instr` is a case-sensitive containment test, unlike `LIKE`.
pub(crate) fn substring_sql<S: ScopeLabel>() -> String {
    format!(
        "{} WHERE instr(text, ?1) > 0 ORDER BY id LIMIT ?2",
        select_sql::<S>()
    )
}

pub(crate) fn by_scope_sql<S: ScopeLabel>() -> String {
    format!(
        "{} WHERE {} = ?1 ORDER BY id LIMIT ?2",
        select_sql::<S>(),
        S::COLUMN
    )
}

pub(crate) fn all_sql<S: ScopeLabel>() -> String {
    format!("{} ORDER BY id", select_sql::<S>())
}

pub(crate) fn count_sql<S: ScopeLabel>() -> String {
    format!("SELECT COUNT(*) FROM {}", S::TABLE)
}

pub(crate) fn delete_by_id_sql<S: ScopeLabel>() -> String {
    format!("DELETE FROM {} WHERE id = ?1", S::TABLE)
}

pub(crate) fn delete_all_sql<S: ScopeLabel>() -> String {
    format!("DELETE FROM {}", S::TABLE)
}

/// Initialize the table for scope label `S`.
pub fn init_schema<S: ScopeLabel>(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(&create_sql::<S>())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_protocols::{ConversationId, DocumentSource};

    #[test]
    fn test_schema_creation() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema::<DocumentSource>(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='documents'")
            .unwrap();
        assert!(stmt.exists([]).unwrap());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema::<ConversationId>(&conn).unwrap();
        init_schema::<ConversationId>(&conn).unwrap();
    }

    #[test]
    fn test_both_labels_share_a_database() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema::<DocumentSource>(&conn).unwrap();
        init_schema::<ConversationId>(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT conversation_id FROM memory LIMIT 1")
            .unwrap();
        assert!(!stmt.exists([]).unwrap());
    }

    #[test]
    fn test_statements_use_label_column() {
        assert!(insert_sql::<DocumentSource>().contains("source"));
        assert!(by_scope_sql::<ConversationId>().contains("conversation_id = ?1"));
    }
}
