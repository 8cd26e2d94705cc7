// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::abi::AbiMember;
use crate::account::AuthSig;

/// Function parameter the custodian node replaces with the requester's address
pub const USER_ADDRESS_PLACEHOLDER: &str = ":userAddress";

/// Expected result of the condition's contract call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnValueTest {
    pub key: String,
    pub comparator: String,
    pub value: serde_json::Value,
}

impl ReturnValueTest {
    /// `= "true"` on the unnamed first output
    pub fn is_true() -> Self {
        Self {
            key: String::new(),
            comparator: "=".to_string(),
            value: serde_json::Value::String("true".to_string()),
        }
    }
}

/// On-chain boolean check gating release of a decryption share
///
/// Field order is the wire order and feeds the condition hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmContractCondition {
    pub contract_address: String,
    pub function_name: String,
    pub function_params: Vec<String>,
    pub function_abi: AbiMember,
    pub chain: String,
    pub return_value_test: ReturnValueTest,
}

impl EvmContractCondition {
    /// Condition that passes when `function(params..) == true`
    pub fn returns_true(
        contract_address: impl Into<String>,
        chain: impl Into<String>,
        function_abi: AbiMember,
        function_params: Vec<String>,
    ) -> Self {
        Self {
            contract_address: contract_address.into(),
            function_name: function_abi.name.clone(),
            function_params,
            function_abi,
            chain: chain.into(),
            return_value_test: ReturnValueTest::is_true(),
        }
    }
}

/// Hex SHA-256 of the JSON serialized condition set
pub fn condition_hash(conditions: &[EvmContractCondition]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(conditions)?;
    Ok(hex::encode(Sha256::digest(&json)))
}

/// Body of a retrieve-share request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedKeyParams {
    pub auth_sig: AuthSig,
    pub chain: String,
    pub evm_contract_conditions: Vec<EvmContractCondition>,
    /// Hex encoded threshold ciphertext of the symmetric key
    pub to_decrypt: String,
}
