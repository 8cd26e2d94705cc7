// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Provenance tag for signatures produced by `personal_sign` style signers
pub const DERIVED_VIA_PERSONAL_SIGN: &str = "web3.eth.personal.sign";

/// Signed authentication assertion binding a wallet address to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSig {
    /// `0x` prefixed 65-byte signature
    pub sig: String,
    pub derived_via: String,
    /// Exact signed message text
    pub signed_message: String,
    pub address: String,
}

impl AuthSig {
    /// Check that `sig` over `signed_message` recovers to `address`
    pub fn verify(&self) -> anyhow::Result<bool> {
        let claimed = Address::from_str(&self.address)
            .map_err(|e| anyhow::anyhow!("Invalid address {}: {}", self.address, e))?;
        let recovered = crate::crypto::recover_address(&self.sig, &self.signed_message)?;
        Ok(recovered == claimed)
    }
}
