// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vault configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const CONFIG_FILE: &str = "strongroom.json";

/// Persistent vault settings.
///
/// The master key is referenced as a hex-encoded 256-bit value so that key
/// material can be injected from the surrounding infrastructure (file mount,
/// secret manager) rather than generated ad hoc.  A malformed key is a
/// startup error — the vault refuses to come up rather than fail per-request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Directory holding the vault databases and file-backed blob root.
    pub data_dir: PathBuf,
    /// Audit trail database filename, relative to `data_dir`.
    pub audit_db: String,
    /// Document catalog database filename, relative to `data_dir`.
    pub catalog_db: String,
    /// Hex-encoded 256-bit master key for encryption at rest.
    pub master_key_hex: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("strongroom-data"),
            audit_db: "audit.db".into(),
            catalog_db: "catalog.db".into(),
            master_key_hex: String::new(),
        }
    }
}

impl VaultConfig {
    /// Full path to the audit database.
    pub fn audit_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.audit_db)
    }

    /// Full path to the catalog database.
    pub fn catalog_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_db)
    }

    /// Load a persisted config from `dir`, if one exists.
    pub fn load(dir: &Path) -> Option<Self> {
        let path = dir.join(CONFIG_FILE);
        let data = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Persist this config to `dir` as pretty-printed JSON.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}
