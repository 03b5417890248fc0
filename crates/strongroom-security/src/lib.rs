// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// strongroom-security — Cryptographic foundation of the document vault.
//
// This crate provides the four security primitives the vault orchestrator
// composes: authenticated encryption at rest (cipher), plaintext digest
// verification (integrity), the classification/clearance decision function
// (policy), and the append-only audit trail (audit).

pub mod audit;
pub mod cipher;
pub mod integrity;
pub mod policy;

// PUBLIC API: Re-export core security primitives
pub use audit::{AuditFilter, AuditLog, AuditRecord};
pub use cipher::{CipherEngine, EncryptedPayload, MasterKey};
pub use integrity::{digest, digest_hex, verify};
pub use policy::{Decision, authorize};
