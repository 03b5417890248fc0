// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document integrity — SHA-256 digests for tamper detection.
//
// Digests are computed over plaintext before encryption and re-checked over
// plaintext after decryption, independently of the AEAD tag.  This catches
// storage-layer corruption and any successful-but-wrong decryption the tag
// alone would not semantically cover.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compute the SHA-256 digest of `data`.
pub fn digest(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the SHA-256 digest of `data` as a lowercase hex string.
///
/// Used for storage columns and audit detail fields.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(digest(data))
}

/// Verify `data` against an expected digest.
///
/// The comparison is constant-time so the digest bytes leak nothing through
/// timing.
pub fn verify(data: &[u8], expected: &[u8; 32]) -> bool {
    let actual = digest(data);
    actual.ct_eq(expected).into()
}
