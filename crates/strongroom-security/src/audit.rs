// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Audit trail — append-only SQLite log of every security-relevant action.
//
// Schema:
//   audit_log(
//     seq         INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp   TEXT NOT NULL,   -- RFC 3339
//     actor_id    TEXT NOT NULL,
//     action      TEXT NOT NULL,   -- serialized AuditAction
//     document_id TEXT,            -- UUID, absent for non-document actions
//     outcome     TEXT NOT NULL,   -- serialized Outcome
//     detail      TEXT             -- optional free-form context
//   )
//
// Append is the only mutation this type exposes.  AUTOINCREMENT plus the
// absence of any UPDATE/DELETE statement gives strictly increasing, gapless
// sequence numbers; the connection sits behind a mutex, so sequence
// assignment is linearizable across concurrent vault operations.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, params_from_iter};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use strongroom_core::error::{Result, VaultError};
use strongroom_core::types::{AuditAction, DocumentId, Outcome, UserId};

/// SQLite schema for the audit table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS audit_log (
        seq         INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp   TEXT NOT NULL,
        actor_id    TEXT NOT NULL,
        action      TEXT NOT NULL,
        document_id TEXT,
        outcome     TEXT NOT NULL,
        detail      TEXT
    )
"#;

/// Convert a `rusqlite::Error` into a `VaultError::Audit`.
///
/// Audit failures get their own variant because the vault must abort the
/// triggering operation when the log cannot accept a record.
fn db_err(e: rusqlite::Error) -> VaultError {
    VaultError::Audit(e.to_string())
}

/// A single entry in the audit log, used for queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Strictly increasing, gapless per log instance.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub actor_id: UserId,
    pub action: AuditAction,
    pub document_id: Option<DocumentId>,
    pub outcome: Outcome,
    pub detail: Option<String>,
}

/// Filter for audit queries.  All fields are conjunctive; `None` means
/// "no constraint".
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub document_id: Option<DocumentId>,
    pub actor_id: Option<UserId>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Append-only audit log backed by a SQLite database.
///
/// There is deliberately no update or delete operation on this type — the
/// log is the sole source of truth for what happened in the vault, and its
/// trustworthiness rests on records being immutable once appended.
pub struct AuditLog {
    conn: Mutex<Connection>,
}

impl AuditLog {
    /// Open (or create) the audit database at `path`.
    ///
    /// WAL mode is enabled for better concurrent-read performance.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(db_err)?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("audit log opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory audit database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(CREATE_TABLE_SQL).map_err(db_err)?;

        debug!("in-memory audit log opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Append a record and return its assigned sequence number.
    ///
    /// The timestamp is taken at append time; callers never supply it.
    #[instrument(skip(self, detail), fields(actor = %actor_id, ?action, ?outcome))]
    pub fn append(
        &self,
        actor_id: &UserId,
        action: AuditAction,
        document_id: Option<&DocumentId>,
        outcome: Outcome,
        detail: Option<&str>,
    ) -> Result<u64> {
        let action_json = serde_json::to_string(&action)
            .map_err(|e| VaultError::Audit(format!("serialize action: {e}")))?;
        let outcome_json = serde_json::to_string(&outcome)
            .map_err(|e| VaultError::Audit(format!("serialize outcome: {e}")))?;

        let conn = self.conn.lock().expect("audit lock poisoned");
        // Captured under the lock so timestamp order agrees with sequence
        // order across concurrent appends.
        let timestamp = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO audit_log (timestamp, actor_id, action, document_id, outcome, detail)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                timestamp,
                actor_id.as_str(),
                action_json,
                document_id.map(|id| id.to_string()),
                outcome_json,
                detail,
            ],
        )
        .map_err(db_err)?;

        let seq = conn.last_insert_rowid() as u64;
        debug!(seq, "audit record appended");
        Ok(seq)
    }

    /// Read records matching `filter`, ordered by sequence ascending.
    ///
    /// The result is a finite snapshot; calling again re-reads from the
    /// start, so consumers can restart at will.
    #[instrument(skip_all)]
    pub fn read(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>> {
        let mut sql = String::from(
            "SELECT seq, timestamp, actor_id, action, document_id, outcome, detail
             FROM audit_log WHERE 1=1",
        );
        let mut args: Vec<String> = Vec::new();

        if let Some(ref doc) = filter.document_id {
            args.push(doc.to_string());
            sql.push_str(&format!(" AND document_id = ?{}", args.len()));
        }
        if let Some(ref actor) = filter.actor_id {
            args.push(actor.as_str().to_owned());
            sql.push_str(&format!(" AND actor_id = ?{}", args.len()));
        }
        if let Some(from) = filter.from {
            args.push(from.to_rfc3339());
            sql.push_str(&format!(" AND timestamp >= ?{}", args.len()));
        }
        if let Some(until) = filter.until {
            args.push(until.to_rfc3339());
            sql.push_str(&format!(" AND timestamp <= ?{}", args.len()));
        }
        sql.push_str(" ORDER BY seq ASC");

        let conn = self.conn.lock().expect("audit lock poisoned");
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;

        let records = stmt
            .query_map(params_from_iter(args.iter()), row_to_record)
            .map_err(db_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)?;

        debug!(count = records.len(), "audit records read");
        Ok(records)
    }

    /// Return the total number of records in the log.
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().expect("audit lock poisoned");
        conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
            .map_err(db_err)
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

/// Map a SQLite row to an `AuditRecord`.
///
/// Column indices must match the SELECT order in `read`.
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditRecord> {
    let seq: i64 = row.get(0)?;
    let timestamp_str: String = row.get(1)?;
    let actor_id: String = row.get(2)?;
    let action_json: String = row.get(3)?;
    let document_id_str: Option<String> = row.get(4)?;
    let outcome_json: String = row.get(5)?;
    let detail: Option<String> = row.get(6)?;

    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map_err(|e| parse_err(1, e))?
        .with_timezone(&Utc);
    let action: AuditAction =
        serde_json::from_str(&action_json).map_err(|e| parse_err(3, e))?;
    let document_id = document_id_str
        .map(|s| Uuid::parse_str(&s).map(DocumentId))
        .transpose()
        .map_err(|e| parse_err(4, e))?;
    let outcome: Outcome =
        serde_json::from_str(&outcome_json).map_err(|e| parse_err(5, e))?;

    Ok(AuditRecord {
        sequence: seq as u64,
        timestamp,
        actor_id: UserId::new(actor_id),
        action,
        document_id,
        outcome,
        detail,
    })
}
