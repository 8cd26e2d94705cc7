// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for integration tests
#![allow(dead_code)]

pub mod mock_node;

use async_trait::async_trait;
use ethers::types::Address;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use threshold_gate::account::Account;
use threshold_gate::conditions::{EvmContractCondition, USER_ADDRESS_PLACEHOLDER};
use threshold_gate::config::GatewayConfig;
use threshold_gate::contracts::{
    ContractError, ContractRegistry, OwnershipKind, OwnershipVerifier, BLOCK_NFT, LICENSE_NFT,
    NODE_STAKING, VERIFY_STAKE_METHOD,
};
use threshold_gate::crypto::{CryptoError, EciesThresholdCipher, IndexedShare, ThresholdCipher};
use threshold_gate::custodian::CustodianClient;
use threshold_gate::gate::AccessGate;
use threshold_gate::storage::MemoryContentStore;

pub use mock_node::{Behavior, MockNetwork, MockNode};

pub const STAKING_ADDRESS: &str = "0x00000000000000000000000000000000000000aa";
pub const BLOCK_ADDRESS: &str = "0x00000000000000000000000000000000000000bb";
pub const LICENSE_ADDRESS: &str = "0x00000000000000000000000000000000000000cc";

/// Deployment document for a contract with a single `view` bool method
pub fn contract_doc(
    name: &str,
    address: &str,
    method: &str,
    inputs: &[(&str, &str)],
    encrypted_key: Option<&str>,
) -> String {
    let inputs: Vec<_> = inputs
        .iter()
        .map(|(name, kind)| json!({ "internalType": kind, "name": name, "type": kind }))
        .collect();
    let mut doc = json!({
        "contractName": name,
        "address": address,
        "abi": [{
            "inputs": inputs,
            "name": method,
            "outputs": [{ "internalType": "bool", "name": "", "type": "bool" }],
            "stateMutability": "view",
            "type": "function"
        }]
    });
    if let Some(key) = encrypted_key {
        doc["encryptedKey"] = json!(key);
    }
    doc.to_string()
}

fn staking_doc(encrypted_key: Option<&str>) -> String {
    contract_doc(
        NODE_STAKING,
        STAKING_ADDRESS,
        VERIFY_STAKE_METHOD,
        &[("node", "address")],
        encrypted_key,
    )
}

/// Registry with the block, license and staking contracts
pub fn registry() -> ContractRegistry {
    let mut registry = ContractRegistry::new("polygon", "mumbai");
    let owner_inputs = [("cid", "bytes32"), ("owner", "address")];
    registry
        .insert_json(&contract_doc(BLOCK_NFT, BLOCK_ADDRESS, "verifyOwner", &owner_inputs, None))
        .unwrap();
    registry
        .insert_json(&contract_doc(LICENSE_NFT, LICENSE_ADDRESS, "verifyOwner", &owner_inputs, None))
        .unwrap();
    registry.insert_json(&staking_doc(None)).unwrap();
    registry
}

/// Condition the gate presents when authenticating the node
pub fn staking_condition(registry: &ContractRegistry) -> EvmContractCondition {
    EvmContractCondition::returns_true(
        STAKING_ADDRESS,
        "mumbai",
        registry.abi_member(NODE_STAKING, VERIFY_STAKE_METHOD).unwrap(),
        vec![USER_ADDRESS_PLACEHOLDER.to_string()],
    )
}

/// `BUIBlockNFT.verifyOwner(cid, :userAddress) == true`
pub fn block_condition(cid_bytes32: &str) -> EvmContractCondition {
    EvmContractCondition::returns_true(
        BLOCK_ADDRESS,
        "mumbai",
        registry().abi_member(BLOCK_NFT, "verifyOwner").unwrap(),
        vec![cid_bytes32.to_string(), USER_ADDRESS_PLACEHOLDER.to_string()],
    )
}

/// Threshold cipher that records the share indices handed to `combine`
#[derive(Default)]
pub struct RecordingCipher {
    inner: EciesThresholdCipher,
    combined: Mutex<Vec<Vec<u8>>>,
}

impl RecordingCipher {
    /// Share indices of every `combine` call, in call order
    pub fn combined(&self) -> Vec<Vec<u8>> {
        self.combined.lock().unwrap().clone()
    }
}

impl ThresholdCipher for RecordingCipher {
    fn encrypt(&self, subnet_public_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.inner.encrypt(subnet_public_key, message)
    }

    fn combine(
        &self,
        shares: &[IndexedShare],
        ciphertext: &[u8],
        public_key_set: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let indices = shares.iter().map(|share| share.index).collect();
        self.combined.lock().unwrap().push(indices);
        self.inner.combine(shares, ciphertext, public_key_set)
    }
}

/// On-chain ownership stand-in
#[derive(Default)]
pub struct MockVerifier {
    owners: Mutex<HashSet<(OwnershipKind, [u8; 32], Address)>>,
    staked: Mutex<HashSet<Address>>,
}

impl MockVerifier {
    pub fn add_owner(&self, kind: OwnershipKind, cid: [u8; 32], address: Address) {
        self.owners.lock().unwrap().insert((kind, cid, address));
    }

    pub fn add_stake(&self, address: Address) {
        self.staked.lock().unwrap().insert(address);
    }
}

#[async_trait]
impl OwnershipVerifier for MockVerifier {
    async fn verify_owner(
        &self,
        kind: OwnershipKind,
        cid: [u8; 32],
        address: Address,
    ) -> Result<bool, ContractError> {
        Ok(self.owners.lock().unwrap().contains(&(kind, cid, address)))
    }

    async fn verify_stake(&self, address: Address) -> Result<bool, ContractError> {
        Ok(self.staked.lock().unwrap().contains(&address))
    }
}

/// A gate wired to a running mock network
pub struct GateFixture {
    pub network: MockNetwork,
    pub gate: AccessGate,
    pub node: Account,
    pub network_key: Vec<u8>,
    pub verifier: Arc<MockVerifier>,
    pub store: Arc<MemoryContentStore>,
}

impl GateFixture {
    /// Five nodes, quorum three, network key published under the staking condition
    pub async fn start() -> Self {
        Self::build(None).await
    }

    /// Like `start`, with the gate combining through `cipher` and dialing
    /// the nodes in reverse order
    pub async fn start_with_cipher(cipher: Arc<dyn ThresholdCipher>) -> Self {
        Self::build(Some(cipher)).await
    }

    async fn build(cipher: Option<Arc<dyn ThresholdCipher>>) -> Self {
        let network = MockNetwork::start(5, 3).await;
        let node = Account::random();
        let network_key = vec![0x5a; 32];

        let mut registry = registry();
        let mut client = CustodianClient::new(network.client_config(3)).unwrap();
        client.connect().await.unwrap();
        let auth_sig = node.siwe("80001", "").await.unwrap();
        let saved = client
            .save_encryption_key(&network_key, &auth_sig, &[staking_condition(&registry)], "mumbai")
            .await
            .unwrap();
        registry
            .insert_json(&staking_doc(Some(&saved.encrypted_key_hex())))
            .unwrap();

        let mut config = GatewayConfig::default();
        config.client = network.client_config(3);
        if cipher.is_some() {
            config.client.endpoints.reverse();
        }

        let verifier = Arc::new(MockVerifier::default());
        verifier.add_stake(node.address());
        let store = Arc::new(MemoryContentStore::new());
        let gate = AccessGate::new(
            config,
            node.clone(),
            Arc::new(registry),
            verifier.clone(),
            store.clone(),
        );
        let gate = match cipher {
            Some(cipher) => gate.with_cipher(cipher),
            None => gate,
        };

        Self {
            network,
            gate,
            node,
            network_key,
            verifier,
            store,
        }
    }
}
