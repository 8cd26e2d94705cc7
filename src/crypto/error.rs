// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! Error taxonomy for the content cipher and the threshold key
//! encapsulation. Wallet signature recovery reports through `anyhow`.
//!
//! ## Error Variants
//!
//! - **EncryptionFailed**: a cipher refused to encrypt (bad key length, AEAD failure)
//! - **DecryptionFailed**: ciphertext could not be opened (wrong key, bad padding, tag mismatch)
//! - **InvalidKey**: key material has the wrong size or is not a curve point
//! - **InvalidPayload**: a hex/binary field could not be parsed
//! - **InsufficientShares**: fewer decryption shares than the key set threshold
//! - **InvalidShare**: a decryption share could not be parsed or is duplicated
//! - **Other**: generic error for library errors or unexpected failures
//!
//! ## Usage Example
//!
//! ```rust
//! use threshold_gate::crypto::CryptoError;
//!
//! fn open(ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
//!     Err(CryptoError::DecryptionFailed {
//!         operation: "content".to_string(),
//!         reason: format!("{} bytes is not a whole number of blocks", ciphertext.len()),
//!     })
//! }
//! ```

use std::fmt;

/// Error type for all cryptographic operations
#[derive(Debug, Clone)]
pub enum CryptoError {
    /// Encryption could not be performed
    EncryptionFailed {
        /// Which operation was being performed
        operation: String,
        /// Specific failure reason
        reason: String,
    },

    /// Ciphertext could not be opened
    ///
    /// This error occurs when:
    /// - Ciphertext is shorter than one block or not block aligned
    /// - PKCS7 padding is invalid (usually a wrong key)
    /// - AEAD authentication tag verification fails
    DecryptionFailed {
        /// Which operation was being performed
        operation: String,
        /// Specific failure reason
        reason: String,
    },

    /// Invalid cryptographic key
    InvalidKey {
        /// Type of key that failed (e.g., "subnet_public_key", "aes_key")
        key_type: String,
        /// Specific failure reason
        reason: String,
    },

    /// Encoded field validation failed
    InvalidPayload {
        /// Which field failed validation
        field: String,
        /// Specific failure reason
        reason: String,
    },

    /// Not enough decryption shares to reach the key set threshold
    InsufficientShares {
        /// Shares handed to the combiner
        provided: usize,
        /// Threshold recorded in the public key set
        required: usize,
    },

    /// A single decryption share is unusable
    InvalidShare {
        /// Share index reported by the node
        index: u8,
        /// Specific failure reason
        reason: String,
    },

    /// Generic error for library errors or unexpected failures
    Other(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::EncryptionFailed { operation, reason } => {
                write!(f, "Encryption failed during {}: {}", operation, reason)
            }
            CryptoError::DecryptionFailed { operation, reason } => {
                write!(f, "Decryption failed during {}: {}", operation, reason)
            }
            CryptoError::InvalidKey { key_type, reason } => {
                write!(f, "Invalid key ({}): {}", key_type, reason)
            }
            CryptoError::InvalidPayload { field, reason } => {
                write!(f, "Invalid payload field '{}': {}", field, reason)
            }
            CryptoError::InsufficientShares { provided, required } => {
                write!(
                    f,
                    "Insufficient decryption shares: got {}, need at least {}",
                    provided, required
                )
            }
            CryptoError::InvalidShare { index, reason } => {
                write!(f, "Invalid decryption share {}: {}", index, reason)
            }
            CryptoError::Other(msg) => {
                write!(f, "Crypto error: {}", msg)
            }
        }
    }
}

impl std::error::Error for CryptoError {}

impl From<anyhow::Error> for CryptoError {
    fn from(err: anyhow::Error) -> Self {
        CryptoError::Other(err.to_string())
    }
}

impl From<hex::FromHexError> for CryptoError {
    fn from(err: hex::FromHexError) -> Self {
        CryptoError::InvalidPayload {
            field: "hex_field".to_string(),
            reason: format!("hex decode error: {}", err),
        }
    }
}

impl From<k256::elliptic_curve::Error> for CryptoError {
    fn from(err: k256::elliptic_curve::Error) -> Self {
        CryptoError::InvalidKey {
            key_type: "secp256k1_point".to_string(),
            reason: format!("k256 error: {}", err),
        }
    }
}

impl From<chacha20poly1305::aead::Error> for CryptoError {
    fn from(err: chacha20poly1305::aead::Error) -> Self {
        CryptoError::DecryptionFailed {
            operation: "AEAD".to_string(),
            reason: format!("chacha20poly1305 error: {}", err),
        }
    }
}
