// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Strongroom.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable reason attached to every authorization denial.
///
/// The reason is recorded verbatim in the audit trail so that a reviewer can
/// distinguish a clearance problem from a role problem without parsing prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenyReason {
    /// The user's clearance is below the document's classification.
    InsufficientClearance,
    /// The user's role does not permit this action at all.
    RoleNotPermitted,
}

impl DenyReason {
    /// Stable token used in audit record detail fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientClearance => "INSUFFICIENT_CLEARANCE",
            Self::RoleNotPermitted => "ROLE_NOT_PERMITTED",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for all Strongroom operations.
#[derive(Debug, Error)]
pub enum VaultError {
    // -- Authorization --
    #[error("operation forbidden: {reason}")]
    Forbidden { reason: DenyReason },

    // -- Lookup --
    #[error("document not found")]
    NotFound,

    // -- Cryptography --
    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    // -- Storage / persistence --
    #[error("blob store error: {0}")]
    Storage(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("audit log unavailable: {0}")]
    Audit(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VaultError {
    /// Convenience constructor for authorization denials.
    pub fn forbidden(reason: DenyReason) -> Self {
        Self::Forbidden { reason }
    }

    /// Whether this error indicates tampering or corruption of stored
    /// content (AEAD tag failure or plaintext digest mismatch).
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Integrity(_) | Self::IntegrityMismatch { .. })
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VaultError>;
