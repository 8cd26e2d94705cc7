// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A chain known to the custodian network
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    /// Name custodian nodes use for this chain in conditions
    pub name: String,
}

impl ChainConfig {
    pub fn ethereum() -> Self {
        ChainConfig {
            chain_id: 1,
            name: "ethereum".to_string(),
        }
    }

    pub fn polygon() -> Self {
        ChainConfig {
            chain_id: 137,
            name: "polygon".to_string(),
        }
    }

    pub fn mumbai() -> Self {
        ChainConfig {
            chain_id: 80001,
            name: "mumbai".to_string(),
        }
    }
}

/// Chain id ↔ condition chain name
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: HashMap<u64, ChainConfig>,
    default_chain: u64,
}

impl ChainRegistry {
    pub fn new() -> Self {
        let mut chains = HashMap::new();
        for chain in [ChainConfig::ethereum(), ChainConfig::polygon(), ChainConfig::mumbai()] {
            chains.insert(chain.chain_id, chain);
        }

        ChainRegistry {
            chains,
            default_chain: 80001,
        }
    }

    pub fn get_chain(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.get(&chain_id)
    }

    /// Condition chain name for a decimal chain id such as `"80001"`
    pub fn name_for_id(&self, chain_id: &str) -> Option<&str> {
        let id = chain_id.trim().parse::<u64>().ok()?;
        self.get_chain(id).map(|chain| chain.name.as_str())
    }

    pub fn id_for_name(&self, name: &str) -> Option<u64> {
        self.chains
            .values()
            .find(|chain| chain.name == name)
            .map(|chain| chain.chain_id)
    }

    pub fn default_chain(&self) -> u64 {
        self.default_chain
    }

    pub fn list_supported_chains(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.chains.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_chain_supported(&self, chain_id: u64) -> bool {
        self.chains.contains_key(&chain_id)
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}
