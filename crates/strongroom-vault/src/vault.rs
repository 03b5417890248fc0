// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document vault orchestrator — composes policy, cipher, integrity, catalog,
// blob store, and audit log into the store/retrieve/delete flows.
//
// Two rules shape every flow here:
//   1. No unaudited security action: if the audit log cannot accept the
//      record for a terminal outcome, the operation is reported as failed,
//      even when the underlying storage mutation nominally succeeded.
//   2. No lock spans a crypto call: encryption and decryption run on
//      plain values between the short catalog/audit critical sections.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use strongroom_core::config::VaultConfig;
use strongroom_core::error::{Result, VaultError};
use strongroom_core::types::{
    AuditAction, ClassificationLevel, Document, DocumentId, Outcome, Role, User, VaultAction,
};
use strongroom_security::audit::{AuditFilter, AuditLog, AuditRecord};
use strongroom_security::cipher::{CipherEngine, EncryptedPayload, MasterKey};
use strongroom_security::policy::{Decision, authorize};
use strongroom_security::{digest, digest_hex, verify};

use crate::blobstore::BlobStore;
use crate::catalog::DocumentCatalog;

/// Shared vault handle.
///
/// All fields are cheaply cloneable (Arc-wrapped or key-schedule-only) so the
/// handle can be passed into worker threads without lifetime issues.  Each
/// operation is a fresh, independent flow; the only global serialization
/// points are the two SQLite connections.
#[derive(Clone)]
pub struct DocumentVault {
    cipher: CipherEngine,
    audit: Arc<AuditLog>,
    catalog: Arc<DocumentCatalog>,
    blobs: Arc<dyn BlobStore>,
}

impl DocumentVault {
    /// Assemble a vault from already-open components.
    pub fn new(
        cipher: CipherEngine,
        audit: AuditLog,
        catalog: DocumentCatalog,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            cipher,
            audit: Arc::new(audit),
            catalog: Arc::new(catalog),
            blobs,
        }
    }

    /// Open a vault from persisted configuration.
    ///
    /// Creates the data directory, opens both databases, and parses the
    /// master key.  A malformed key fails here, at startup, never
    /// per-request.
    #[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
    pub fn open(config: &VaultConfig, blobs: Arc<dyn BlobStore>) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let key = MasterKey::from_hex(&config.master_key_hex)?;
        let cipher = CipherEngine::new(&key)?;
        let audit = AuditLog::open(config.audit_db_path())?;
        let catalog = DocumentCatalog::open(config.catalog_db_path())?;

        info!("document vault opened");
        Ok(Self::new(cipher, audit, catalog, blobs))
    }

    // -- Store ---------------------------------------------------------------

    /// Encrypt and persist a new document.
    ///
    /// On success the returned `Document` is the immutable metadata record;
    /// exactly one audit record is appended whatever the outcome of an
    /// authorized attempt.
    #[instrument(skip(self, bytes), fields(filename, %classification, actor = %user.id))]
    pub fn store(
        &self,
        bytes: &[u8],
        filename: &str,
        classification: ClassificationLevel,
        user: &User,
    ) -> Result<Document> {
        self.store_inner(bytes, filename, classification, user, None)
    }

    /// Store a new version of an existing document.
    ///
    /// The new record links back to its predecessor through `supersedes`;
    /// the predecessor itself is left untouched (versioning is linkage,
    /// never ownership or mutation).
    #[instrument(skip(self, bytes), fields(%supersedes, actor = %user.id))]
    pub fn store_revision(
        &self,
        supersedes: &DocumentId,
        bytes: &[u8],
        filename: &str,
        classification: ClassificationLevel,
        user: &User,
    ) -> Result<Document> {
        // Predecessor must exist; like Retrieve, a miss on a nonexistent id
        // is not an auditable event.
        if self.catalog.fetch(supersedes)?.is_none() {
            return Err(VaultError::NotFound);
        }
        self.store_inner(bytes, filename, classification, user, Some(*supersedes))
    }

    fn store_inner(
        &self,
        bytes: &[u8],
        filename: &str,
        classification: ClassificationLevel,
        user: &User,
        supersedes: Option<DocumentId>,
    ) -> Result<Document> {
        if let Decision::Deny(reason) = authorize(user, classification, VaultAction::Upload) {
            self.audit.append(
                &user.id,
                AuditAction::Upload,
                None,
                Outcome::Failure,
                Some(reason.as_str()),
            )?;
            return Err(VaultError::forbidden(reason));
        }

        let content_digest = digest(bytes);
        let payload = self.cipher.encrypt(bytes)?;

        let storage_path = match self.blobs.put(&payload.to_bytes()) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "blob store rejected payload");
                self.audit.append(
                    &user.id,
                    AuditAction::Upload,
                    None,
                    Outcome::Failure,
                    Some("blob store unavailable"),
                )?;
                return Err(e);
            }
        };

        let document = Document {
            id: DocumentId::new(),
            filename: filename.to_owned(),
            classification,
            content_digest,
            storage_path,
            size_bytes: bytes.len() as u64,
            created_at: Utc::now(),
            created_by: user.id.clone(),
            supersedes,
            tombstoned: false,
        };
        self.catalog.insert(&document)?;

        self.audit.append(
            &user.id,
            AuditAction::Upload,
            Some(&document.id),
            Outcome::Success,
            Some(&document.digest_hex()),
        )?;

        info!(document_id = %document.id, size = document.size_bytes, "document stored");
        Ok(document)
    }

    // -- Retrieve ------------------------------------------------------------

    /// Decrypt and return a document's plaintext.
    ///
    /// Integrity is checked twice: the AEAD tag during decryption and the
    /// stored plaintext digest afterwards.  Either failure is fatal for the
    /// retrieval — corrupted or tampered content is never partially
    /// returned.
    #[instrument(skip(self), fields(document_id = %id, actor = %user.id))]
    pub fn retrieve(&self, id: &DocumentId, user: &User) -> Result<Vec<u8>> {
        // A nonexistent id yields NotFound with no audit record, matching
        // the tombstoned case so that existence cannot be probed through
        // audit side effects.
        let Some(document) = self.catalog.fetch(id)? else {
            return Err(VaultError::NotFound);
        };
        if document.tombstoned {
            return Err(VaultError::NotFound);
        }

        if let Decision::Deny(reason) =
            authorize(user, document.classification, VaultAction::Download)
        {
            self.audit.append(
                &user.id,
                AuditAction::Download,
                Some(id),
                Outcome::Failure,
                Some(reason.as_str()),
            )?;
            return Err(VaultError::forbidden(reason));
        }

        let raw = match self.blobs.get(&document.storage_path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "blob store read failed");
                self.audit.append(
                    &user.id,
                    AuditAction::Download,
                    Some(id),
                    Outcome::Failure,
                    Some("blob store unavailable"),
                )?;
                return Err(e);
            }
        };

        let plaintext = match EncryptedPayload::from_bytes(&raw)
            .and_then(|payload| self.cipher.decrypt(&payload))
        {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(error = %e, "stored payload failed authentication");
                self.audit.append(
                    &user.id,
                    AuditAction::Download,
                    Some(id),
                    Outcome::Failure,
                    Some("integrity violation"),
                )?;
                return Err(e);
            }
        };

        if !verify(&plaintext, &document.content_digest) {
            warn!("plaintext digest mismatch after successful decryption");
            self.audit.append(
                &user.id,
                AuditAction::Download,
                Some(id),
                Outcome::Failure,
                Some("integrity violation"),
            )?;
            return Err(VaultError::IntegrityMismatch {
                expected: document.digest_hex(),
                actual: digest_hex(&plaintext),
            });
        }

        self.audit
            .append(&user.id, AuditAction::Download, Some(id), Outcome::Success, None)?;

        info!(document_id = %id, size = plaintext.len(), "document retrieved");
        Ok(plaintext)
    }

    // -- Delete --------------------------------------------------------------

    /// Remove a document's bytes and tombstone its metadata.
    ///
    /// The audit history for the document is never removed; deleting a
    /// nonexistent or already-deleted id is `NotFound` with no audit record.
    #[instrument(skip(self), fields(document_id = %id, actor = %user.id))]
    pub fn delete(&self, id: &DocumentId, user: &User) -> Result<()> {
        let Some(document) = self.catalog.fetch(id)? else {
            return Err(VaultError::NotFound);
        };
        if document.tombstoned {
            return Err(VaultError::NotFound);
        }

        if let Decision::Deny(reason) =
            authorize(user, document.classification, VaultAction::Delete)
        {
            self.audit.append(
                &user.id,
                AuditAction::Delete,
                Some(id),
                Outcome::Failure,
                Some(reason.as_str()),
            )?;
            return Err(VaultError::forbidden(reason));
        }

        if let Err(e) = self.blobs.delete(&document.storage_path) {
            warn!(error = %e, "blob store delete failed");
            self.audit.append(
                &user.id,
                AuditAction::Delete,
                Some(id),
                Outcome::Failure,
                Some("blob store unavailable"),
            )?;
            return Err(e);
        }

        self.catalog.tombstone(id)?;
        self.audit
            .append(&user.id, AuditAction::Delete, Some(id), Outcome::Success, None)?;

        info!(document_id = %id, "document deleted");
        Ok(())
    }

    // -- Read-only surfaces --------------------------------------------------

    /// List live document metadata visible to `user`.
    ///
    /// Administrators list across all classification levels; officers see
    /// only documents at or below their clearance.  Auditors have no
    /// document visibility at all.
    #[instrument(skip(self), fields(actor = %user.id))]
    pub fn list_documents(&self, user: &User) -> Result<Vec<Document>> {
        if let Decision::Deny(reason) =
            authorize(user, ClassificationLevel::Unclassified, VaultAction::ListMetadata)
        {
            self.audit.append(
                &user.id,
                AuditAction::AccessDenied,
                None,
                Outcome::Failure,
                Some(reason.as_str()),
            )?;
            return Err(VaultError::forbidden(reason));
        }

        let documents = self.catalog.list()?;
        Ok(match user.role {
            Role::Administrator => documents,
            _ => documents
                .into_iter()
                .filter(|d| d.classification <= user.clearance)
                .collect(),
        })
    }

    /// Read audit records matching `filter`.
    ///
    /// Restricted to auditors and administrators; denials are themselves
    /// recorded.  Successful reads are not logged — reading the log is not
    /// a mutation, and logging reads of the log would bury the signal.
    #[instrument(skip(self, filter), fields(actor = %user.id))]
    pub fn list_audit_records(
        &self,
        filter: &AuditFilter,
        user: &User,
    ) -> Result<Vec<AuditRecord>> {
        if let Decision::Deny(reason) =
            authorize(user, ClassificationLevel::Unclassified, VaultAction::AuditRead)
        {
            self.audit.append(
                &user.id,
                AuditAction::AccessDenied,
                None,
                Outcome::Failure,
                Some(reason.as_str()),
            )?;
            return Err(VaultError::forbidden(reason));
        }

        self.audit.read(filter)
    }

    /// Total number of audit records (any role may ask for the count).
    pub fn audit_count(&self) -> Result<u64> {
        self.audit.count()
    }
}
