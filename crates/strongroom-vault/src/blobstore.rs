// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blob store — the opaque byte-storage collaborator consumed by the vault.
//
// The vault hands the store fully encrypted payloads and gets back opaque
// storage paths; the store knows nothing about classification, digests, or
// auditing.  A completed `put` must be visible to a subsequent `get` for the
// same path (external consistency contract).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, instrument};
use uuid::Uuid;

use strongroom_core::error::{Result, VaultError};
use strongroom_core::types::StoragePath;

/// Opaque key-value byte storage.
///
/// All failures surface as `VaultError::Storage`; the vault never retries
/// within a single operation — retry policy belongs to the caller, which can
/// make a fresh idempotency decision.
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` and return the opaque path they were stored under.
    fn put(&self, bytes: &[u8]) -> Result<StoragePath>;

    /// Fetch the bytes stored under `path`.
    fn get(&self, path: &StoragePath) -> Result<Vec<u8>>;

    /// Remove the bytes under `path`.  Returns whether anything was removed.
    fn delete(&self, path: &StoragePath) -> Result<bool>;

    /// Whether `path` currently holds bytes.
    fn exists(&self, path: &StoragePath) -> Result<bool>;

    /// Size in bytes of the payload under `path`.
    fn size(&self, path: &StoragePath) -> Result<u64>;
}

/// In-memory blob store, used in tests and as the simplest reference
/// implementation.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.objects.lock().expect("blob lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, bytes: &[u8]) -> Result<StoragePath> {
        let path = Uuid::new_v4().to_string();
        self.objects
            .lock()
            .expect("blob lock poisoned")
            .insert(path.clone(), bytes.to_vec());
        Ok(StoragePath::new(path))
    }

    fn get(&self, path: &StoragePath) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .expect("blob lock poisoned")
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| VaultError::Storage(format!("no blob at {path}")))
    }

    fn delete(&self, path: &StoragePath) -> Result<bool> {
        Ok(self
            .objects
            .lock()
            .expect("blob lock poisoned")
            .remove(path.as_str())
            .is_some())
    }

    fn exists(&self, path: &StoragePath) -> Result<bool> {
        Ok(self
            .objects
            .lock()
            .expect("blob lock poisoned")
            .contains_key(path.as_str()))
    }

    fn size(&self, path: &StoragePath) -> Result<u64> {
        self.objects
            .lock()
            .expect("blob lock poisoned")
            .get(path.as_str())
            .map(|b| b.len() as u64)
            .ok_or_else(|| VaultError::Storage(format!("no blob at {path}")))
    }
}

/// Filesystem blob store — one file per payload under a root directory,
/// named by a random UUID so paths carry no information about content.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open a blob store rooted at `root`, creating the directory if needed.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn open(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .map_err(|e| VaultError::Storage(format!("create blob root: {e}")))?;
        debug!("blob store opened");
        Ok(Self { root })
    }

    fn file_path(&self, path: &StoragePath) -> PathBuf {
        self.root.join(path.as_str())
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, bytes: &[u8]) -> Result<StoragePath> {
        let path = StoragePath::new(Uuid::new_v4().to_string());
        std::fs::write(self.file_path(&path), bytes)
            .map_err(|e| VaultError::Storage(format!("write blob: {e}")))?;
        Ok(path)
    }

    fn get(&self, path: &StoragePath) -> Result<Vec<u8>> {
        std::fs::read(self.file_path(path))
            .map_err(|e| VaultError::Storage(format!("read blob {path}: {e}")))
    }

    fn delete(&self, path: &StoragePath) -> Result<bool> {
        match std::fs::remove_file(self.file_path(path)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(VaultError::Storage(format!("delete blob {path}: {e}"))),
        }
    }

    fn exists(&self, path: &StoragePath) -> Result<bool> {
        Ok(self.file_path(path).exists())
    }

    fn size(&self, path: &StoragePath) -> Result<u64> {
        std::fs::metadata(self.file_path(path))
            .map(|m| m.len())
            .map_err(|e| VaultError::Storage(format!("stat blob {path}: {e}")))
    }
}
