// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end vault flows against on-disk storage: full lifecycle, clearance
// denials, tamper detection, and audit-trail completeness.

use std::sync::Arc;

use strongroom_core::config::VaultConfig;
use strongroom_core::error::{DenyReason, VaultError};
use strongroom_core::types::{AuditAction, ClassificationLevel, Outcome, Role, User};
use strongroom_security::audit::AuditFilter;
use strongroom_security::cipher::MasterKey;
use strongroom_vault::{DocumentVault, FsBlobStore};

struct TestVault {
    vault: DocumentVault,
    blob_root: std::path::PathBuf,
    _dir: tempfile::TempDir,
}

fn open_vault() -> TestVault {
    let dir = tempfile::tempdir().expect("create temp dir");
    let blob_root = dir.path().join("blobs");

    let mut config = VaultConfig::default();
    config.data_dir = dir.path().to_path_buf();
    config.master_key_hex = MasterKey::generate().to_hex();

    let blobs = Arc::new(FsBlobStore::open(blob_root.clone()).expect("open blob store"));
    let vault = DocumentVault::open(&config, blobs).expect("open vault");

    TestVault {
        vault,
        blob_root,
        _dir: dir,
    }
}

fn officer(clearance: ClassificationLevel) -> User {
    User::new("officer-wren", Role::Officer, clearance)
}

fn auditor() -> User {
    User::new("auditor-marsh", Role::Auditor, ClassificationLevel::Unclassified)
}

#[test]
fn full_document_lifecycle() {
    let t = open_vault();
    let owner = officer(ClassificationLevel::Secret);

    let doc = t
        .vault
        .store(
            b"operation summary, week 34",
            "summary.txt",
            ClassificationLevel::Secret,
            &owner,
        )
        .expect("store");
    assert_eq!(doc.size_bytes, 26);

    // Another officer with sufficient clearance can read it back.
    let reader = User::new("officer-tully", Role::Officer, ClassificationLevel::TopSecret);
    let plaintext = t.vault.retrieve(&doc.id, &reader).expect("retrieve");
    assert_eq!(plaintext, b"operation summary, week 34");

    // Revise, then delete the original.
    let v2 = t
        .vault
        .store_revision(
            &doc.id,
            b"operation summary, week 34 (corrected)",
            "summary.txt",
            ClassificationLevel::Secret,
            &owner,
        )
        .expect("store revision");
    assert_eq!(v2.supersedes, Some(doc.id));

    t.vault.delete(&doc.id, &owner).expect("delete");
    assert!(matches!(
        t.vault.retrieve(&doc.id, &reader),
        Err(VaultError::NotFound)
    ));
    // The revision is unaffected by deleting its predecessor.
    assert_eq!(
        t.vault.retrieve(&v2.id, &reader).unwrap(),
        b"operation summary, week 34 (corrected)"
    );

    // Audit trail: upload, download, upload (revision), delete, download
    // (post-delete NotFound is unaudited), download.
    let records = t
        .vault
        .list_audit_records(&AuditFilter::default(), &auditor())
        .expect("audit read");
    let actions: Vec<AuditAction> = records.iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        [
            AuditAction::Upload,
            AuditAction::Download,
            AuditAction::Upload,
            AuditAction::Delete,
            AuditAction::Download,
        ]
    );
    assert!(records.iter().all(|r| r.outcome == Outcome::Success));

    // Sequences are gapless and ascending.
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.sequence, i as u64 + 1);
    }
}

#[test]
fn insufficient_clearance_is_denied_and_audited() {
    let t = open_vault();
    let owner = officer(ClassificationLevel::TopSecret);

    let doc = t
        .vault
        .store(b"eyes only", "memo.txt", ClassificationLevel::TopSecret, &owner)
        .expect("store");

    let junior = officer(ClassificationLevel::Confidential);
    let result = t.vault.retrieve(&doc.id, &junior);
    assert!(matches!(
        result,
        Err(VaultError::Forbidden {
            reason: DenyReason::InsufficientClearance
        })
    ));

    // Denial appears in the document's history under the attempted action.
    let history = t
        .vault
        .list_audit_records(
            &AuditFilter {
                document_id: Some(doc.id),
                ..Default::default()
            },
            &auditor(),
        )
        .expect("audit read");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].action, AuditAction::Download);
    assert_eq!(history[1].outcome, Outcome::Failure);
    assert_eq!(history[1].detail.as_deref(), Some("INSUFFICIENT_CLEARANCE"));
    assert_eq!(history[1].actor_id, junior.id);
}

#[test]
fn under_cleared_auditor_gets_clearance_denial() {
    let t = open_vault();
    let owner = officer(ClassificationLevel::TopSecret);

    let doc = t
        .vault
        .store(b"eyes only", "memo.txt", ClassificationLevel::TopSecret, &owner)
        .expect("store");

    // Clearance is checked before role, so an auditor below the document's
    // classification is denied for the clearance, not the role.
    let aud = User::new("auditor-marsh", Role::Auditor, ClassificationLevel::Confidential);
    let result = t.vault.retrieve(&doc.id, &aud);
    assert!(matches!(
        result,
        Err(VaultError::Forbidden {
            reason: DenyReason::InsufficientClearance
        })
    ));

    let history = t
        .vault
        .list_audit_records(
            &AuditFilter {
                document_id: Some(doc.id),
                ..Default::default()
            },
            &auditor(),
        )
        .expect("audit read");
    assert_eq!(history.len(), 2); // upload + the one denial
    assert_eq!(history[1].action, AuditAction::Download);
    assert_eq!(history[1].outcome, Outcome::Failure);
    assert_eq!(history[1].detail.as_deref(), Some("INSUFFICIENT_CLEARANCE"));
    assert_eq!(history[1].actor_id, aud.id);
}

#[test]
fn tampered_blob_is_detected_and_audited() {
    let t = open_vault();
    let owner = officer(ClassificationLevel::Secret);

    let doc = t
        .vault
        .store(b"untampered content", "t.txt", ClassificationLevel::Secret, &owner)
        .expect("store");

    // Corrupt one byte of the stored payload behind the vault's back.
    let blob_file = t.blob_root.join(doc.storage_path.as_str());
    let mut raw = std::fs::read(&blob_file).expect("read blob");
    let last = raw.len() - 1;
    raw[last] ^= 0x01;
    std::fs::write(&blob_file, &raw).expect("write tampered blob");

    let result = t.vault.retrieve(&doc.id, &owner);
    assert!(
        matches!(result, Err(ref e) if e.is_integrity_violation()),
        "tampered payload must fail integrity, got {result:?}"
    );

    let history = t
        .vault
        .list_audit_records(
            &AuditFilter {
                document_id: Some(doc.id),
                ..Default::default()
            },
            &auditor(),
        )
        .expect("audit read");
    let failure = history.last().expect("failure record");
    assert_eq!(failure.action, AuditAction::Download);
    assert_eq!(failure.outcome, Outcome::Failure);
    assert_eq!(failure.detail.as_deref(), Some("integrity violation"));
}

#[test]
fn truncated_blob_is_a_malformed_payload() {
    let t = open_vault();
    let owner = officer(ClassificationLevel::Secret);

    let doc = t
        .vault
        .store(b"soon to be truncated", "t.txt", ClassificationLevel::Secret, &owner)
        .expect("store");

    let blob_file = t.blob_root.join(doc.storage_path.as_str());
    std::fs::write(&blob_file, b"short").expect("truncate blob");

    let result = t.vault.retrieve(&doc.id, &owner);
    assert!(matches!(result, Err(VaultError::Decryption(_))));
}

#[test]
fn auditor_has_no_document_access() {
    let t = open_vault();
    let owner = officer(ClassificationLevel::Secret);
    let doc = t
        .vault
        .store(b"content", "c.txt", ClassificationLevel::Unclassified, &owner)
        .expect("store");

    let aud = User::new("auditor-marsh", Role::Auditor, ClassificationLevel::TopSecret);

    // Even with top-secret clearance the auditor role is content-blind.
    assert!(matches!(
        t.vault.retrieve(&doc.id, &aud),
        Err(VaultError::Forbidden {
            reason: DenyReason::RoleNotPermitted
        })
    ));
    assert!(matches!(
        t.vault.list_documents(&aud),
        Err(VaultError::Forbidden { .. })
    ));
    assert!(matches!(
        t.vault
            .store(b"x", "x.txt", ClassificationLevel::Unclassified, &aud),
        Err(VaultError::Forbidden { .. })
    ));

    // But the audit trail is fully readable, including the denials above.
    let records = t
        .vault
        .list_audit_records(&AuditFilter::default(), &aud)
        .expect("audit read");
    assert_eq!(records.len(), 4); // upload + 3 denials
    assert_eq!(
        records
            .iter()
            .filter(|r| r.outcome == Outcome::Failure)
            .count(),
        3
    );
}

#[test]
fn vault_state_survives_reopen() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let blob_root = dir.path().join("blobs");

    let mut config = VaultConfig::default();
    config.data_dir = dir.path().to_path_buf();
    config.master_key_hex = MasterKey::generate().to_hex();
    config.persist(dir.path()).expect("persist config");

    let owner = officer(ClassificationLevel::Secret);
    let doc = {
        let blobs = Arc::new(FsBlobStore::open(blob_root.clone()).expect("open blob store"));
        let vault = DocumentVault::open(&config, blobs).expect("open vault");
        vault
            .store(b"durable", "d.txt", ClassificationLevel::Secret, &owner)
            .expect("store")
    };

    // Reopen from the persisted configuration.
    let reloaded = VaultConfig::load(dir.path()).expect("config file present");
    let blobs = Arc::new(FsBlobStore::open(blob_root).expect("reopen blob store"));
    let vault = DocumentVault::open(&reloaded, blobs).expect("reopen vault");

    assert_eq!(vault.retrieve(&doc.id, &owner).unwrap(), b"durable");
    // Audit sequence continues past the first session's records.
    let records = vault
        .list_audit_records(&AuditFilter::default(), &auditor())
        .expect("audit read");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].sequence, 2);
}
