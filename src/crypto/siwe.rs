// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sign-In With Ethereum messages
//!
//! Builds the EIP-4361 style message that requesters and the node account
//! sign, and the HMAC statement that binds a message to one content item and
//! one origin.

use ethers::types::Address;
use ethers::utils::to_checksum;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Service identity shown in the first line of the sign-in message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiweDomain {
    pub service: String,
    pub uri: String,
}

impl Default for SiweDomain {
    fn default() -> Self {
        Self {
            service: "BlocksUI".to_string(),
            uri: "https://blocksui.xyz".to_string(),
        }
    }
}

impl SiweDomain {
    /// Render the sign-in message
    ///
    /// `nonce` is the issue time in unix seconds and `issued_at` the same
    /// instant as RFC3339.
    pub fn message(
        &self,
        address: &Address,
        statement: &str,
        chain_id: &str,
        nonce: &str,
        issued_at: &str,
    ) -> String {
        format!(
            "{} wants you to sign in with your Ethereum account:\n{}\n\n{}\nURI: {}\nVersion: 1\nChain ID: {}\nNonce: {}\nIssued At: {}",
            self.service,
            to_checksum(address, None),
            statement,
            self.uri,
            chain_id,
            nonce,
            issued_at
        )
    }
}

/// Statement binding a signature to `cid` and `origin` under the network key
///
/// `"Block Authorization:\n" + hex(HMAC-SHA256(key, cid + ":" + origin)) + "\n"`
pub fn authorization_statement(key: &[u8], cid: &str, origin: &str) -> Result<String, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| CryptoError::InvalidKey {
        key_type: "hmac_key".to_string(),
        reason: e.to_string(),
    })?;
    mac.update(cid.as_bytes());
    mac.update(b":");
    mac.update(origin.as_bytes());
    let payload = mac.finalize().into_bytes();

    Ok(format!("Block Authorization:\n{}\n", hex::encode(payload)))
}
