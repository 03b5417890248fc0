// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// strongroom-vault — The document vault orchestrator.
//
// Composes the security primitives (cipher, integrity, policy, audit) with
// an external blob store into the store/retrieve/delete flows.  The blob
// store itself is an external collaborator; this crate ships a trait plus
// in-memory and filesystem reference backends.

pub mod blobstore;
pub mod catalog;
pub mod vault;

// PUBLIC API
pub use blobstore::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use catalog::DocumentCatalog;
pub use vault::DocumentVault;
