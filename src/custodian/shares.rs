// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Share collection and combination

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::client::CustodianClient;
use super::error::CustodianError;
use super::node::RETRIEVE_PATH;
use crate::conditions::EncryptedKeyParams;
use crate::crypto::IndexedShare;

/// A node's reply to a retrieve request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecryptionShare {
    pub decryption_share: String,
    pub error_code: String,
    pub message: String,
    pub result: String,
    pub share_index: u8,
    pub status: String,
}

impl DecryptionShare {
    pub fn is_fulfilled(&self) -> bool {
        self.error_code.is_empty() && (self.status == "fulfilled" || self.result == "success")
    }

    /// Accept this reply as a combinable share, or say why not
    pub fn into_indexed(self) -> Result<IndexedShare, String> {
        if !self.error_code.is_empty() {
            return Err(format!("error code {}: {}", self.error_code, self.message));
        }
        if !self.is_fulfilled() {
            return Err(format!(
                "not fulfilled (status {:?}, result {:?})",
                self.status, self.result
            ));
        }
        let share = hex::decode(&self.decryption_share)
            .map_err(|e| format!("malformed share hex: {}", e))?;
        if share.is_empty() {
            return Err("empty share".to_string());
        }

        Ok(IndexedShare {
            index: self.share_index,
            share,
        })
    }
}

impl CustodianClient {
    /// Recover the symmetric key behind `params.to_decrypt`
    ///
    /// Requests a share from every connected node and waits for all of them,
    /// even after enough valid shares arrived. Valid shares are ordered by
    /// share index before combination.
    pub async fn get_encryption_key(
        &self,
        params: &EncryptedKeyParams,
    ) -> Result<Vec<u8>, CustodianError> {
        let keys = self.ready_keys()?;
        let ciphertext = hex::decode(&params.to_decrypt)
            .map_err(|e| CustodianError::encoding("toDecrypt", e))?;
        let public_key_set = hex::decode(&keys.network_pub_key_set)
            .map_err(|e| CustodianError::encoding("networkPublicKeySet", e))?;

        let nodes = self.connected_endpoints();
        let requests: Vec<_> = nodes
            .iter()
            .map(|url| {
                self.transport.post::<_, DecryptionShare>(
                    url,
                    RETRIEVE_PATH,
                    params,
                    self.config.request_timeout,
                )
            })
            .collect();
        let responses = join_all(requests).await;

        let mut shares = Vec::with_capacity(nodes.len());
        for (url, response) in nodes.iter().zip(responses) {
            match response {
                Ok(reply) => match reply.into_indexed() {
                    Ok(share) => {
                        debug!("Accepted share {} from {}", share.index, url);
                        shares.push(share);
                    }
                    Err(reason) => warn!("Dropped share from {}: {}", url, reason),
                },
                Err(e) => warn!("Share request failed: {}", e),
            }
        }

        let required = self.config.min_node_count;
        if shares.len() < required {
            warn!(
                "Insufficient decryption shares: {}/{} from {} nodes",
                shares.len(),
                required,
                nodes.len()
            );
            return Err(CustodianError::InsufficientShares {
                collected: shares.len(),
                required,
            });
        }

        shares.sort_by_key(|share| share.index);
        let key = self.cipher.combine(&shares, &ciphertext, &public_key_set)?;
        info!("Combined {} decryption shares", shares.len());

        Ok(key)
    }
}
