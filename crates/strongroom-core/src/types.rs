// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Strongroom document vault.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordinal sensitivity level attached to every stored document.
///
/// The derived `Ord` follows declaration order, so clearance checks are plain
/// comparisons: `user.clearance >= document.classification`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassificationLevel {
    Unclassified,
    Confidential,
    Secret,
    TopSecret,
}

impl ClassificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unclassified => "UNCLASSIFIED",
            Self::Confidential => "CONFIDENTIAL",
            Self::Secret => "SECRET",
            Self::TopSecret => "TOP_SECRET",
        }
    }

    /// All levels in ascending order of sensitivity.
    pub const ALL: [Self; 4] = [
        Self::Unclassified,
        Self::Confidential,
        Self::Secret,
        Self::TopSecret,
    ];
}

impl std::fmt::Display for ClassificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of an acting user.  User accounts themselves are managed by the
/// surrounding application; the vault only reads `{id, role, clearance}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Regular operator — may upload, download, and delete within clearance.
    Officer,
    /// Oversight role — reads the audit trail, never document content.
    Auditor,
    /// Administrative role — full document operations plus metadata listing
    /// across all classification levels.
    Administrator,
}

/// Opaque identifier of an acting user, assigned by the external
/// user/session collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of the acting user, resolved by the session layer before any
/// vault call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub role: Role,
    pub clearance: ClassificationLevel,
}

impl User {
    pub fn new(id: impl Into<String>, role: Role, clearance: ClassificationLevel) -> Self {
        Self {
            id: UserId::new(id),
            role,
            clearance,
        }
    }
}

/// Unique identifier for a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle returned by the blob store when a payload is persisted.
/// The vault never interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoragePath(pub String);

impl StoragePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable metadata record for a stored document.
///
/// Created once on a successful store and never mutated afterwards — a new
/// version of the same file is a fresh `Document` linked back through
/// `supersedes`.  Deletion tombstones the record; the row (and the full audit
/// history referencing it) is never physically erased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub classification: ClassificationLevel,
    /// SHA-256 digest of the plaintext, computed before encryption.
    pub content_digest: [u8; 32],
    pub storage_path: StoragePath,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    /// Back-reference to the document this one replaces, if any.
    pub supersedes: Option<DocumentId>,
    /// Set on authorized delete.  Tombstoned documents are invisible to
    /// retrieval but keep their audit trail.
    pub tombstoned: bool,
}

impl Document {
    /// Hex rendering of the content digest, used in storage columns and
    /// audit detail.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.content_digest)
    }
}

/// Actions submitted to the classification policy for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VaultAction {
    Upload,
    Download,
    Delete,
    /// Read access to the audit trail.
    AuditRead,
    /// Administrative listing of document metadata (never content).
    ListMetadata,
}

/// Action recorded in an audit record.
///
/// Store/retrieve/delete attempts are logged under the attempted action with
/// a failure outcome when denied; `AccessDenied` covers denials of the
/// read-only surfaces (audit reads, metadata listing) that have no mutating
/// action of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    Upload,
    Download,
    Delete,
    AccessDenied,
}

/// Outcome of an audited operation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_levels_are_totally_ordered() {
        use ClassificationLevel::*;
        assert!(Unclassified < Confidential);
        assert!(Confidential < Secret);
        assert!(Secret < TopSecret);

        // ALL is ascending.
        for pair in ClassificationLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn document_digest_hex_round_trips() {
        let digest = [0xABu8; 32];
        let doc = Document {
            id: DocumentId::new(),
            filename: "report.pdf".into(),
            classification: ClassificationLevel::Secret,
            content_digest: digest,
            storage_path: StoragePath::new("blob/1"),
            size_bytes: 42,
            created_at: Utc::now(),
            created_by: UserId::new("officer-1"),
            supersedes: None,
            tombstoned: false,
        };
        assert_eq!(doc.digest_hex(), hex::encode(digest));
        assert_eq!(doc.digest_hex().len(), 64);
    }

    #[test]
    fn document_id_display_is_uuid() {
        let id = DocumentId::new();
        assert_eq!(id.to_string().len(), 36);
    }
}
