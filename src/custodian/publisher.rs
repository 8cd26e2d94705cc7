// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Condition publishing

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::client::CustodianClient;
use super::error::CustodianError;
use super::node::STORE_PATH;
use crate::account::AuthSig;
use crate::conditions::{condition_hash, EvmContractCondition};

/// Body of a store-condition request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCondParams<'a> {
    /// Hex SHA-256 of the encrypted key blob
    pub key: &'a str,
    /// Hex SHA-256 of the condition set
    pub val: &'a str,
    pub auth_sig: &'a AuthSig,
    pub chain: &'a str,
    /// Misspelled on the wire; custodian nodes expect exactly this name
    #[serde(rename = "permanant")]
    pub permanent: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SaveCondResponse {
    pub result: String,
    pub error: String,
}

/// Outcome of storing an encryption key's condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedKey {
    /// Threshold ciphertext of the symmetric key
    pub encrypted_key: Vec<u8>,
    pub key_hash: String,
    pub condition_hash: String,
    /// Nodes that acknowledged the store
    pub stored_on: usize,
}

impl SavedKey {
    /// Hex form, as later sent in `toDecrypt`
    pub fn encrypted_key_hex(&self) -> String {
        hex::encode(&self.encrypted_key)
    }
}

impl CustodianClient {
    /// Threshold-encrypt `symmetric_key` and register its condition set
    ///
    /// Partial store failures are logged only. The call fails when the
    /// client is not ready or the encryption itself fails.
    pub async fn save_encryption_key(
        &self,
        symmetric_key: &[u8],
        auth_sig: &AuthSig,
        conditions: &[EvmContractCondition],
        chain: &str,
    ) -> Result<SavedKey, CustodianError> {
        let keys = self.ready_keys()?;
        let subnet_key = hex::decode(&keys.subnet_pub_key)
            .map_err(|e| CustodianError::encoding("subnetPublicKey", e))?;

        let encrypted_key = self.cipher.encrypt(&subnet_key, symmetric_key)?;
        let key_hash = hex::encode(Sha256::digest(&encrypted_key));
        let condition_hash = condition_hash(conditions)
            .map_err(|e| CustodianError::encoding("evmContractConditions", e))?;

        let params = SaveCondParams {
            key: &key_hash,
            val: &condition_hash,
            auth_sig,
            chain,
            permanent: 1,
        };

        let nodes = self.connected_endpoints();
        let requests: Vec<_> = nodes
            .iter()
            .map(|url| {
                self.transport.post::<_, SaveCondResponse>(
                    url,
                    STORE_PATH,
                    &params,
                    self.config.request_timeout,
                )
            })
            .collect();
        let responses = join_all(requests).await;

        let mut stored_on = 0;
        for (url, response) in nodes.iter().zip(responses) {
            match response {
                Ok(reply) if reply.error.is_empty() => stored_on += 1,
                Ok(reply) => warn!("Failed to store condition on {}: {}", url, reply.error),
                Err(e) => warn!("Failed to store condition: {}", e),
            }
        }
        info!(
            "Stored condition {} on {}/{} nodes",
            key_hash,
            stored_on,
            nodes.len()
        );

        Ok(SavedKey {
            encrypted_key,
            key_hash,
            condition_hash,
            stored_on,
        })
    }
}
