// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Contract address and ABI registry
//!
//! Loaded from deployment documents of the form
//! `{contractName, address, abi, encryptedKey?}` and passed explicitly to
//! whatever needs it.

use ethers::abi::{Abi, Function};
use ethers::types::Address;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use super::error::ContractError;
use crate::conditions::AbiMember;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractDocument {
    contract_name: String,
    address: Address,
    abi: Abi,
    #[serde(default)]
    encrypted_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContractEntry {
    pub name: String,
    pub address: Address,
    pub abi: Abi,
    pub encrypted_key: Option<String>,
    raw: serde_json::Value,
}

impl ContractEntry {
    pub fn function(&self, method: &str) -> Result<&Function, ContractError> {
        self.abi
            .function(method)
            .map_err(|_| ContractError::MethodNotFound {
                contract: self.name.clone(),
                method: method.to_string(),
            })
    }

    /// The deployment document as loaded
    pub fn document(&self) -> &serde_json::Value {
        &self.raw
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    chain: String,
    network: String,
    contracts: BTreeMap<String, ContractEntry>,
}

impl ContractRegistry {
    pub fn new(chain: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
            network: network.into(),
            contracts: BTreeMap::new(),
        }
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    /// Register one deployment document, replacing any same-named entry
    pub fn insert_json(&mut self, json: &str) -> Result<&ContractEntry, ContractError> {
        let raw: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ContractError::InvalidDocument(e.to_string()))?;
        let doc: ContractDocument = serde_json::from_value(raw.clone())
            .map_err(|e| ContractError::InvalidDocument(e.to_string()))?;

        debug!("Registered {} at {:?}", doc.contract_name, doc.address);
        let name = doc.contract_name.clone();
        self.contracts.insert(
            name.clone(),
            ContractEntry {
                name: doc.contract_name,
                address: doc.address,
                abi: doc.abi,
                encrypted_key: doc.encrypted_key,
                raw,
            },
        );
        self.get(&name)
    }

    /// Load every `*.json` document in `dir`
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, ContractError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let json = std::fs::read_to_string(path)?;
            self.insert_json(&json).map_err(|e| {
                ContractError::InvalidDocument(format!("{}: {}", path.display(), e))
            })?;
        }

        info!(
            "Loaded {} contract documents for {}/{}",
            paths.len(),
            self.chain,
            self.network
        );
        Ok(paths.len())
    }

    pub fn get(&self, name: &str) -> Result<&ContractEntry, ContractError> {
        self.contracts
            .get(name)
            .ok_or_else(|| ContractError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Condition-ready ABI member for `contract.method`
    pub fn abi_member(&self, contract: &str, method: &str) -> Result<AbiMember, ContractError> {
        let function = self.get(contract)?.function(method)?;
        Ok(AbiMember::from_function(function))
    }

    /// All documents keyed by contract name, with chain and network
    pub fn marshal_abis(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("chain".to_string(), self.chain.clone().into());
        map.insert("network".to_string(), self.network.clone().into());
        for (name, entry) in &self.contracts {
            map.insert(name.clone(), entry.raw.clone());
        }
        serde_json::Value::Object(map)
    }
}
