// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document catalog — persistent metadata records backed by SQLite.
//
// The catalog stores document metadata (but NOT the document bytes); the
// encrypted payloads live in the blob store and are referenced by opaque
// storage path.  Rows are immutable after insert except for the tombstone
// flag; rows are never deleted, so the audit trail always has a document to
// point at.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use strongroom_core::error::{Result, VaultError};
use strongroom_core::types::{ClassificationLevel, Document, DocumentId, StoragePath, UserId};

/// SQLite schema for the documents table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id             TEXT PRIMARY KEY,
        filename       TEXT NOT NULL,
        classification TEXT NOT NULL,
        content_digest TEXT NOT NULL,
        storage_path   TEXT NOT NULL,
        size_bytes     INTEGER NOT NULL,
        created_at     TEXT NOT NULL,
        created_by     TEXT NOT NULL,
        supersedes     TEXT,
        tombstoned     INTEGER NOT NULL DEFAULT 0
    )
"#;

const SELECT_COLUMNS: &str = "id, filename, classification, content_digest, storage_path,
     size_bytes, created_at, created_by, supersedes, tombstoned";

/// Convert a `rusqlite::Error` into a `VaultError::Database`.
fn db_err(e: rusqlite::Error) -> VaultError {
    VaultError::Database(e.to_string())
}

/// Persistent document metadata catalog.
///
/// The connection sits behind a mutex so a single catalog handle can be
/// shared across concurrent vault operations.
pub struct DocumentCatalog {
    conn: Mutex<Connection>,
}

impl DocumentCatalog {
    /// Open (or create) the catalog database at `path`.
    ///
    /// WAL mode is enabled for better concurrent-read performance.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        info!("document catalog opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory catalog (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("in-memory document catalog opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert a freshly created document record.
    #[instrument(skip(self, document), fields(document_id = %document.id))]
    pub fn insert(&self, document: &Document) -> Result<()> {
        let classification_json = serde_json::to_string(&document.classification)
            .map_err(|e| VaultError::Database(format!("serialize classification: {e}")))?;

        let conn = self.conn.lock().expect("catalog lock poisoned");
        conn.execute(
            "INSERT INTO documents (id, filename, classification, content_digest,
             storage_path, size_bytes, created_at, created_by, supersedes, tombstoned)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                document.id.to_string(),
                document.filename,
                classification_json,
                document.digest_hex(),
                document.storage_path.as_str(),
                document.size_bytes as i64,
                document.created_at.to_rfc3339(),
                document.created_by.as_str(),
                document.supersedes.map(|id| id.to_string()),
                document.tombstoned as i32,
            ],
        )
        .map_err(db_err)?;

        info!(document_id = %document.id, "document record inserted");
        Ok(())
    }

    /// Fetch a document by id, tombstoned or not.
    ///
    /// Returns `None` if no such row exists; callers decide how visible a
    /// tombstoned record is for their operation.
    #[instrument(skip(self), fields(document_id = %id))]
    pub fn fetch(&self, id: &DocumentId) -> Result<Option<Document>> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM documents WHERE id = ?1"
            ))
            .map_err(db_err)?;

        let mut rows = stmt
            .query_map(params![id.to_string()], row_to_document)
            .map_err(db_err)?;

        match rows.next() {
            Some(Ok(doc)) => Ok(Some(doc)),
            Some(Err(e)) => Err(db_err(e)),
            None => Ok(None),
        }
    }

    /// Mark a document deleted.  The row itself stays forever.
    #[instrument(skip(self), fields(document_id = %id))]
    pub fn tombstone(&self, id: &DocumentId) -> Result<()> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let rows = conn
            .execute(
                "UPDATE documents SET tombstoned = 1 WHERE id = ?1",
                params![id.to_string()],
            )
            .map_err(db_err)?;

        if rows == 0 {
            return Err(VaultError::NotFound);
        }

        info!(document_id = %id, "document tombstoned");
        Ok(())
    }

    /// All live (non-tombstoned) documents, newest first.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock().expect("catalog lock poisoned");
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM documents
                 WHERE tombstoned = 0 ORDER BY created_at DESC"
            ))
            .map_err(db_err)?;

        let documents = stmt
            .query_map([], row_to_document)
            .map_err(db_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)?;

        debug!(count = documents.len(), "documents listed");
        Ok(documents)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn parse_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

/// Map a SQLite row to a `Document`.
///
/// Column indices must match `SELECT_COLUMNS`.
fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let id_str: String = row.get(0)?;
    let filename: String = row.get(1)?;
    let classification_json: String = row.get(2)?;
    let digest_hex: String = row.get(3)?;
    let storage_path: String = row.get(4)?;
    let size_bytes: i64 = row.get(5)?;
    let created_at_str: String = row.get(6)?;
    let created_by: String = row.get(7)?;
    let supersedes_str: Option<String> = row.get(8)?;
    let tombstoned: i32 = row.get(9)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| parse_err(0, e))?;
    let classification: ClassificationLevel =
        serde_json::from_str(&classification_json).map_err(|e| parse_err(2, e))?;

    let digest_raw = hex::decode(&digest_hex).map_err(|e| parse_err(3, e))?;
    let content_digest: [u8; 32] = digest_raw.try_into().map_err(|_| {
        parse_err(
            3,
            std::io::Error::new(std::io::ErrorKind::InvalidData, "digest is not 32 bytes"),
        )
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| parse_err(6, e))?
        .with_timezone(&Utc);
    let supersedes = supersedes_str
        .map(|s| Uuid::parse_str(&s).map(DocumentId))
        .transpose()
        .map_err(|e| parse_err(8, e))?;

    Ok(Document {
        id: DocumentId(id),
        filename,
        classification,
        content_digest,
        storage_path: StoragePath::new(storage_path),
        size_bytes: size_bytes as u64,
        created_at,
        created_by: UserId::new(created_by),
        supersedes,
        tombstoned: tombstoned != 0,
    })
}
