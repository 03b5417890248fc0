// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cipher engine — AES-256-GCM authenticated encryption for document bytes.
//
// Every encryption call draws a fresh 96-bit nonce from the OS RNG; nonces
// are never derived from caller input, so nonce reuse under one key cannot
// be provoked from outside.  The stored payload layout is
// `{nonce(12) | tag(16) | ciphertext}`.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, instrument};
use zeroize::{Zeroize, ZeroizeOnDrop};

use strongroom_core::error::{Result, VaultError};

/// AES-256-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// AES-256-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// 256-bit key for encryption at rest.  Zeroised on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; 32],
}

impl MasterKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Parse a hex-encoded 256-bit key, as carried in `VaultConfig`.
    ///
    /// Anything other than exactly 64 hex characters is rejected; callers
    /// treat this as fatal at startup rather than deferring the failure to
    /// the first encrypt call.
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        let raw = hex::decode(hex_key)
            .map_err(|e| VaultError::InvalidKey(format!("master key is not valid hex: {e}")))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|v: Vec<u8>| {
                VaultError::InvalidKey(format!("master key must be 32 bytes, got {}", v.len()))
            })?;
        Ok(Self { bytes })
    }

    /// Generate a fresh random key from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

/// Output of one encryption call.  Exists transiently between the cipher
/// engine and the blob store; the vault never persists plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Serialize to the on-disk layout `{nonce | tag | ciphertext}`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + TAG_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the on-disk layout.
    ///
    /// A payload shorter than nonce + tag cannot have been produced by
    /// `encrypt` and is rejected as malformed — a hard error, distinct from
    /// an authentication failure on well-formed input.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(VaultError::Decryption(format!(
                "stored payload too short: {} bytes, need at least {}",
                raw.len(),
                NONCE_LEN + TAG_LEN
            )));
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&raw[..NONCE_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&raw[NONCE_LEN..NONCE_LEN + TAG_LEN]);

        Ok(Self {
            nonce,
            tag,
            ciphertext: raw[NONCE_LEN + TAG_LEN..].to_vec(),
        })
    }
}

/// Stateless AES-256-GCM engine bound to one master key.
///
/// All methods take `&self`; the engine is safe to share across concurrent
/// store/retrieve flows.
#[derive(Clone)]
pub struct CipherEngine {
    cipher: Aes256Gcm,
}

impl CipherEngine {
    pub fn new(key: &MasterKey) -> Result<Self> {
        let cipher = Aes256Gcm::new_from_slice(&key.bytes)
            .map_err(|e| VaultError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    #[instrument(skip_all, fields(plaintext_len = plaintext.len()))]
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedPayload> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        // aes-gcm appends the 16-byte tag to the ciphertext; split it back
        // out so the payload carries the tag explicitly.
        let mut sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| VaultError::Encryption("AEAD seal failed".into()))?;

        let tag_offset = sealed.len() - TAG_LEN;
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&sealed[tag_offset..]);
        sealed.truncate(tag_offset);

        debug!(ciphertext_len = sealed.len(), "encryption complete");
        Ok(EncryptedPayload {
            nonce,
            tag,
            ciphertext: sealed,
        })
    }

    /// Decrypt a payload, verifying the authentication tag.
    ///
    /// A tag mismatch means the stored bytes were tampered with or corrupted;
    /// no partial plaintext is ever returned.
    #[instrument(skip_all, fields(ciphertext_len = payload.ciphertext.len()))]
    pub fn decrypt(&self, payload: &EncryptedPayload) -> Result<Vec<u8>> {
        let mut sealed = Vec::with_capacity(payload.ciphertext.len() + TAG_LEN);
        sealed.extend_from_slice(&payload.ciphertext);
        sealed.extend_from_slice(&payload.tag);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&payload.nonce), sealed.as_slice())
            .map_err(|_| {
                VaultError::Integrity("authentication tag verification failed".into())
            })?;

        debug!(plaintext_len = plaintext.len(), "decryption complete");
        Ok(plaintext)
    }
}
