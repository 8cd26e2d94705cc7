// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cryptographic primitives for access-gated content
//!
//! - **AES-CBC**: content confidentiality under a random per-item key
//! - **Threshold**: encapsulation of that key to the custodian network and
//!   recombination of the nodes' decryption shares
//! - **Signature**: EIP-191 signature recovery for requester authentication
//! - **SIWE**: sign-in message and authorization statement construction
//!
//! ## Security Considerations
//!
//! - Content keys never leave process memory unencrypted
//! - Decryption shares are combined only after ordering by share index
//! - A failed combination never yields partial key bytes

pub mod aes_cbc;
pub mod error;
pub mod signature;
pub mod siwe;
pub mod threshold;

pub use aes_cbc::prng;
pub use error::CryptoError;
pub use signature::{eip191_bytes, recover_address};
pub use siwe::{authorization_statement, SiweDomain};
pub use threshold::{EciesThresholdCipher, IndexedShare, PublicKeySet, ThresholdCipher};
