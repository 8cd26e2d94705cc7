// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Structural ABI description carried inside access conditions

use ethers::abi::{Function, Param};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiIo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&Param> for AbiIo {
    fn from(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            kind: param.kind.to_string(),
        }
    }
}

/// ABI entry of the contract function a condition calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiMember {
    pub name: String,
    pub inputs: Vec<AbiIo>,
    pub outputs: Vec<AbiIo>,
    #[serde(default)]
    pub constant: bool,
    pub state_mutability: String,
}

impl AbiMember {
    /// Describe a contract function for the custodian network
    ///
    /// Conditions are only ever evaluated with `eth_call`, so the member is
    /// always published as `view`.
    pub fn from_function(function: &Function) -> Self {
        Self {
            name: function.name.clone(),
            inputs: function.inputs.iter().map(AbiIo::from).collect(),
            outputs: function.outputs.iter().map(AbiIo::from).collect(),
            constant: false,
            state_mutability: "view".to_string(),
        }
    }
}
