// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AES-CBC Content Cipher
//!
//! Encrypts content blobs with the per-item symmetric key that the custodian
//! network protects.
//!
//! **Ciphertext Format**:
//! ```text
//! [iv (16 bytes) | AES-CBC ciphertext, PKCS7 padded]
//! ```
//!
//! Keys of 16 bytes select AES-128, 32 bytes select AES-256.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};

use super::error::CryptoError;

/// AES block size, also the IV length
pub const BLOCK_SIZE: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Generate `len` cryptographically random bytes
///
/// Used for fresh symmetric content keys.
pub fn prng(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Encrypt `plaintext` under `key` with a random IV prefixed to the output
///
/// # Errors
///
/// Returns `CryptoError::InvalidKey` if the key is not 16 or 32 bytes.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut iv = [0u8; BLOCK_SIZE];
    OsRng.fill_bytes(&mut iv);

    let body = match key.len() {
        16 => Aes128CbcEnc::new_from_slices(key, &iv)
            .map_err(|e| invalid_key(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => Aes256CbcEnc::new_from_slices(key, &iv)
            .map_err(|e| invalid_key(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        other => return Err(invalid_key(format!("expected 16 or 32 bytes, got {}", other))),
    };

    let mut ciphertext = Vec::with_capacity(BLOCK_SIZE + body.len());
    ciphertext.extend_from_slice(&iv);
    ciphertext.extend_from_slice(&body);
    Ok(ciphertext)
}

/// Decrypt an IV-prefixed AES-CBC ciphertext and strip PKCS7 padding
///
/// # Errors
///
/// Returns error if:
/// - Ciphertext is shorter than one block (no IV)
/// - The body after the IV is empty or not block aligned
/// - Key size is not 16 or 32 bytes
/// - Padding is invalid after decryption (wrong key or corrupted data)
pub fn decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < BLOCK_SIZE {
        return Err(CryptoError::DecryptionFailed {
            operation: "aes_cbc".to_string(),
            reason: format!(
                "ciphertext too short: expected at least {} bytes, got {}",
                BLOCK_SIZE,
                ciphertext.len()
            ),
        });
    }

    let (iv, body) = ciphertext.split_at(BLOCK_SIZE);
    if body.is_empty() || body.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::DecryptionFailed {
            operation: "aes_cbc".to_string(),
            reason: format!("ciphertext body of {} bytes is not block aligned", body.len()),
        });
    }

    let plaintext = match key.len() {
        16 => Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|e| invalid_key(e.to_string()))?
            .decrypt_padded_vec_mut::<Pkcs7>(body),
        32 => Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|e| invalid_key(e.to_string()))?
            .decrypt_padded_vec_mut::<Pkcs7>(body),
        other => return Err(invalid_key(format!("expected 16 or 32 bytes, got {}", other))),
    };

    plaintext.map_err(|_| CryptoError::DecryptionFailed {
        operation: "aes_cbc".to_string(),
        reason: "invalid PKCS7 padding (wrong key or corrupted data)".to_string(),
    })
}

fn invalid_key(reason: String) -> CryptoError {
    CryptoError::InvalidKey {
        key_type: "aes_key".to_string(),
        reason,
    }
}
