// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use chrono::{DateTime, FixedOffset};
use ethers::types::Address;
use serde::{Deserialize, Serialize};

use super::error::GateError;

/// Fields the requester's sign-in message is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageParams {
    pub address: Address,
    /// `0x`-prefixed bytes32 form of the content CID
    pub cid: String,
    /// Decimal chain id
    pub chain: String,
    /// RFC3339
    pub issue_date: String,
    pub origin: String,
}

impl MessageParams {
    pub fn issued_at(&self) -> Result<DateTime<FixedOffset>, GateError> {
        DateTime::parse_from_rfc3339(&self.issue_date)
            .map_err(|e| GateError::Validation(format!("issueDate {}: {}", self.issue_date, e)))
    }

    /// Raw 32-byte content id
    pub fn cid_bytes(&self) -> Result<[u8; 32], GateError> {
        let bytes = hex::decode(self.cid.trim_start_matches("0x"))
            .map_err(|e| GateError::Validation(format!("cid {}: {}", self.cid, e)))?;
        bytes
            .try_into()
            .map_err(|_| GateError::Validation(format!("cid {} is not 32 bytes", self.cid)))
    }
}

/// A signed request for access to one content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthParams {
    pub address: Address,
    pub cid: String,
    pub chain: String,
    pub issue_date: String,
    pub origin: String,
    pub signature: String,
    /// `block` or `license`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub token_id: String,
}

impl AuthParams {
    pub fn message_params(&self) -> MessageParams {
        MessageParams {
            address: self.address,
            cid: self.cid.clone(),
            chain: self.chain.clone(),
            issue_date: self.issue_date.clone(),
            origin: self.origin.clone(),
        }
    }

    /// Reject blank required fields
    pub fn validate(&self) -> Result<(), GateError> {
        for (name, value) in [
            ("cid", &self.cid),
            ("chain", &self.chain),
            ("issueDate", &self.issue_date),
            ("origin", &self.origin),
            ("signature", &self.signature),
            ("type", &self.kind),
        ] {
            if value.trim().is_empty() {
                return Err(GateError::Validation(format!("{} is required", name)));
            }
        }
        Ok(())
    }
}
