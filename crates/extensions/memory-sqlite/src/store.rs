//! SQLite metadata store implementation.

use std::marker::PhantomData;
use std::path::Path;

use rusqlite::params;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use mnemo_protocols::record::{vector_from_bytes, vector_to_bytes};
use mnemo_protocols::{Record, RetrievalError, ScopeLabel};

use crate::schema::{
    all_sql, by_id_sql, by_scope_sql, count_sql, delete_all_sql, delete_by_id_sql, init_schema,
    insert_sql, substring_sql,
};

type RawRow = (i64, String, Vec<u8>, String);

fn backend_error(e: impl std::fmt::Display) -> RetrievalError {
    RetrievalError::BackendUnavailable(e.to_string())
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_row((id, text, blob, scope): RawRow) -> Result<Record, RetrievalError> {
    let vector = vector_from_bytes(&blob).ok_or_else(|| {
        RetrievalError::CorruptIndex(format!("record {} has a malformed vector blob", id))
    })?;
    Ok(Record {
        id: id as u64,
        text,
        vector,
        scope,
    })
}

fn decode_rows(rows: Vec<RawRow>) -> Result<Vec<Record>, RetrievalError> {
    rows.into_iter().map(decode_row).collect()
}

/// Durable mapping from record id to `(text, vector, scope)`.
///
/// Every write is committed before the call returns.
pub struct MetadataStore<S: ScopeLabel> {
    conn: Connection,
    _label: PhantomData<S>,
}

impl<S: ScopeLabel> MetadataStore<S> {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, RetrievalError> {
        let conn = Connection::open_in_memory().await.map_err(backend_error)?;
        Self::init(conn).await
    }

    /// Open (or create) a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).await.map_err(backend_error)?;
        info!("Opened metadata store {:?} (table {})", path, S::TABLE);
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, RetrievalError> {
        conn.call(|conn| init_schema::<S>(conn))
            .await
            .map_err(backend_error)?;
        Ok(Self {
            conn,
            _label: PhantomData,
        })
    }

    /// Insert a record, returning its id (previous max id + 1, starting at 1).
    pub async fn insert(
        &self,
        text: &str,
        vector: &[f32],
        scope: &str,
    ) -> Result<u64, RetrievalError> {
        let sql = insert_sql::<S>();
        let text = text.to_string();
        let blob = vector_to_bytes(vector);
        let scope = scope.to_string();

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(&sql, params![text, blob, scope])?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(backend_error)?;

        debug!("Inserted {} record {}", S::TABLE, id);
        Ok(id as u64)
    }

    /// Insert several records in one transaction, returning their ids in order.
    pub async fn insert_batch(
        &self,
        rows: Vec<(String, Vec<f32>, String)>,
    ) -> Result<Vec<u64>, RetrievalError> {
        let sql = insert_sql::<S>();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut ids = Vec::with_capacity(rows.len());
                {
                    let mut stmt = tx.prepare(&sql)?;
                    for (text, vector, scope) in rows {
                        stmt.execute(params![text, vector_to_bytes(&vector), scope])?;
                        ids.push(tx.last_insert_rowid() as u64);
                    }
                }
                tx.commit()?;
                Ok(ids)
            })
            .await
            .map_err(backend_error)
    }

    /// Look up a record by id.
    pub async fn get_by_id(&self, id: u64) -> Result<Option<Record>, RetrievalError> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        let sql = by_id_sql::<S>();

        let row = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                match stmt.query_row([id], read_row) {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(backend_error)?;

        row.map(decode_row).transpose()
    }

    /// Records whose text contains `needle` (case-sensitive), by ascending id.
    pub async fn scan_substring(
        &self,
        needle: &str,
        limit: usize,
    ) -> Result<Vec<Record>, RetrievalError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.query_limited(substring_sql::<S>(), needle.to_string(), limit)
            .await
    }

    /// Records owned by `scope`, by ascending id.
    pub async fn list_scope(
        &self,
        scope: &str,
        limit: usize,
    ) -> Result<Vec<Record>, RetrievalError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.query_limited(by_scope_sql::<S>(), scope.to_string(), limit)
            .await
    }

    async fn query_limited(
        &self,
        sql: String,
        arg: String,
        limit: usize,
    ) -> Result<Vec<Record>, RetrievalError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![arg, limit], read_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(backend_error)?;
        decode_rows(rows)
    }

    /// Every record, by ascending id.
    pub async fn all_records(&self) -> Result<Vec<Record>, RetrievalError> {
        let sql = all_sql::<S>();
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], read_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(backend_error)?;
        decode_rows(rows)
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<usize, RetrievalError> {
        let sql = count_sql::<S>();
        let count: i64 = self
            .conn
            .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
            .await
            .map_err(backend_error)?;
        Ok(count as usize)
    }

    /// Delete one record. Returns whether it existed.
    pub async fn delete(&self, id: u64) -> Result<bool, RetrievalError> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(false);
        };
        let sql = delete_by_id_sql::<S>();
        let deleted = self
            .conn
            .call(move |conn| Ok(conn.execute(&sql, [id])?))
            .await
            .map_err(backend_error)?;
        Ok(deleted > 0)
    }

    /// Delete every record. The id sequence continues where it left off.
    pub async fn clear(&self) -> Result<(), RetrievalError> {
        let sql = delete_all_sql::<S>();
        self.conn
            .call(move |conn| {
                conn.execute(&sql, [])?;
                Ok(())
            })
            .await
            .map_err(backend_error)?;
        debug!("Cleared {} records", S::TABLE);
        Ok(())
    }

    /// Delete every record and restart the id sequence at 1.
    pub async fn reset(&self) -> Result<(), RetrievalError> {
        let sql = delete_all_sql::<S>();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(&sql, [])?;
                tx.execute("DELETE FROM sqlite_sequence WHERE name = ?1", [S::TABLE])?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(backend_error)?;
        debug!("Reset {} records and id sequence", S::TABLE);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
