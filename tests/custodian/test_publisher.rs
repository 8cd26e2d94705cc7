// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Condition publishing against in-process nodes

use sha2::{Digest, Sha256};

use crate::common::{block_condition, Behavior, MockNetwork};
use threshold_gate::account::Account;
use threshold_gate::conditions::condition_hash;
use threshold_gate::custodian::CustodianClient;

#[tokio::test]
async fn test_condition_stored_on_every_node() {
    let network = MockNetwork::start(5, 3).await;
    let mut client = CustodianClient::new(network.client_config(3)).unwrap();
    client.connect().await.unwrap();

    let auth_sig = Account::random().siwe("80001", "").await.unwrap();
    let conditions = vec![block_condition(&format!("0x{}", "ef".repeat(32)))];
    let saved = client
        .save_encryption_key(&[4u8; 32], &auth_sig, &conditions, "mumbai")
        .await
        .unwrap();

    assert_eq!(saved.stored_on, 5);
    assert_eq!(saved.key_hash, hex::encode(Sha256::digest(&saved.encrypted_key)));
    assert_eq!(saved.condition_hash, condition_hash(&conditions).unwrap());
    assert_ne!(saved.encrypted_key, vec![4u8; 32]);

    for node in &network.nodes {
        let stored = node.stored_conditions();
        assert_eq!(stored.get(&saved.key_hash), Some(&saved.condition_hash));
    }
}

#[tokio::test]
async fn test_partial_store_failure_is_tolerated() {
    let network = MockNetwork::start(5, 3).await;
    let mut client = CustodianClient::new(network.client_config(3)).unwrap();
    client.connect().await.unwrap();

    network.set_behavior(1, Behavior::ErrorCode);
    network.set_behavior(3, Behavior::Down);

    let auth_sig = Account::random().siwe("80001", "").await.unwrap();
    let saved = client
        .save_encryption_key(&[6u8; 32], &auth_sig, &[block_condition("0x00")], "mumbai")
        .await
        .unwrap();

    assert_eq!(saved.stored_on, 3);
    assert!(network.nodes[1].stored_conditions().is_empty());
    assert!(network.nodes[3].stored_conditions().is_empty());
}

#[tokio::test]
async fn test_each_save_encrypts_afresh() {
    let network = MockNetwork::start(3, 2).await;
    let mut client = CustodianClient::new(network.client_config(2)).unwrap();
    client.connect().await.unwrap();

    let auth_sig = Account::random().siwe("80001", "").await.unwrap();
    let conditions = [block_condition("0x01")];
    let first = client
        .save_encryption_key(&[1u8; 32], &auth_sig, &conditions, "mumbai")
        .await
        .unwrap();
    let second = client
        .save_encryption_key(&[1u8; 32], &auth_sig, &conditions, "mumbai")
        .await
        .unwrap();

    assert_ne!(first.encrypted_key, second.encrypted_key);
    assert_ne!(first.key_hash, second.key_hash);
    assert_eq!(first.condition_hash, second.condition_hash);
}
