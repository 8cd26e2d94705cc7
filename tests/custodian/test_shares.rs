// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Share collection and combination against in-process nodes

use std::sync::Arc;
use std::time::Instant;

use crate::common::mock_node::TEST_TIMEOUT;
use crate::common::{block_condition, Behavior, MockNetwork, RecordingCipher};
use threshold_gate::account::Account;
use threshold_gate::conditions::EncryptedKeyParams;
use threshold_gate::custodian::{ClientConfig, CustodianClient, CustodianError};

struct Sealed {
    client: CustodianClient,
    account: Account,
    params: EncryptedKeyParams,
}

/// Connect, then store `key` under a block condition
async fn seal(network: &MockNetwork, min_node_count: usize, key: &[u8]) -> Sealed {
    let mut client = CustodianClient::new(network.client_config(min_node_count)).unwrap();
    client.connect().await.unwrap();

    let account = Account::random();
    let auth_sig = account.siwe("80001", "").await.unwrap();
    let conditions = vec![block_condition(&format!("0x{}", "ab".repeat(32)))];
    let saved = client
        .save_encryption_key(key, &auth_sig, &conditions, "mumbai")
        .await
        .unwrap();

    let params = EncryptedKeyParams {
        auth_sig,
        chain: "mumbai".to_string(),
        evm_contract_conditions: conditions,
        to_decrypt: saved.encrypted_key_hex(),
    };
    Sealed {
        client,
        account,
        params,
    }
}

#[tokio::test]
async fn test_save_then_get_round_trip() {
    let network = MockNetwork::start(5, 3).await;
    let key: Vec<u8> = (0u8..32).collect();
    let sealed = seal(&network, 3, &key).await;

    let recovered = sealed.client.get_encryption_key(&sealed.params).await.unwrap();
    assert_eq!(recovered, key);
    for node in &network.nodes {
        assert_eq!(node.retrievals(), 1);
    }
}

#[tokio::test]
async fn test_any_quorum_subset_recovers_same_key() {
    let network = MockNetwork::start(5, 3).await;
    let key = vec![0x42; 32];
    let sealed = seal(&network, 3, &key).await;

    network.set_behavior(0, Behavior::ErrorCode);
    network.set_behavior(1, Behavior::ErrorCode);
    let from_tail = sealed.client.get_encryption_key(&sealed.params).await.unwrap();

    network.set_behavior(0, Behavior::Honest);
    network.set_behavior(1, Behavior::Honest);
    network.set_behavior(3, Behavior::ErrorCode);
    network.set_behavior(4, Behavior::ErrorCode);
    let from_head = sealed.client.get_encryption_key(&sealed.params).await.unwrap();

    assert_eq!(from_tail, key);
    assert_eq!(from_head, key);
}

#[tokio::test]
async fn test_malformed_shares_are_dropped() {
    let network = MockNetwork::start(5, 4).await;
    let key = vec![7u8; 32];
    let sealed = seal(&network, 4, &key).await;

    network.set_behavior(2, Behavior::Malformed);
    assert_eq!(
        sealed.client.get_encryption_key(&sealed.params).await.unwrap(),
        key
    );

    network.set_behavior(3, Behavior::Malformed);
    let err = sealed
        .client
        .get_encryption_key(&sealed.params)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CustodianError::InsufficientShares {
            collected: 3,
            required: 4
        }
    ));
}

#[tokio::test]
async fn test_waits_for_slow_nodes() {
    let network = MockNetwork::start(5, 3).await;
    let key = vec![3u8; 32];
    let sealed = seal(&network, 3, &key).await;

    network.set_behavior(4, Behavior::Slow);
    let started = Instant::now();
    let recovered = sealed.client.get_encryption_key(&sealed.params).await.unwrap();

    assert_eq!(recovered, key);
    assert!(started.elapsed() >= TEST_TIMEOUT);
}

#[tokio::test]
async fn test_changed_conditions_are_refused() {
    let network = MockNetwork::start(5, 3).await;
    let sealed = seal(&network, 3, &[1u8; 32]).await;

    let mut params = sealed.params.clone();
    params.evm_contract_conditions = vec![block_condition(&format!("0x{}", "cd".repeat(32)))];

    let err = sealed.client.get_encryption_key(&params).await.unwrap_err();
    assert!(matches!(
        err,
        CustodianError::InsufficientShares { collected: 0, .. }
    ));
}

#[tokio::test]
async fn test_network_side_condition_check() {
    let network = MockNetwork::start(5, 3).await;
    let key = vec![5u8; 32];
    let sealed = seal(&network, 3, &key).await;

    network.restrict();
    assert!(sealed
        .client
        .get_encryption_key(&sealed.params)
        .await
        .is_err());

    network.grant("verifyOwner", sealed.account.address());
    assert_eq!(
        sealed.client.get_encryption_key(&sealed.params).await.unwrap(),
        key
    );
}

#[tokio::test]
async fn test_forged_auth_sig_is_refused() {
    let network = MockNetwork::start(5, 3).await;
    let sealed = seal(&network, 3, &[8u8; 32]).await;

    let mut params = sealed.params.clone();
    params.auth_sig.address = format!("{:?}", Account::random().address());

    assert!(sealed.client.get_encryption_key(&params).await.is_err());
}

#[tokio::test]
async fn test_bad_ciphertext_hex_fails_before_fan_out() {
    let network = MockNetwork::start(3, 2).await;
    let sealed = seal(&network, 2, &[2u8; 32]).await;

    let mut params = sealed.params.clone();
    params.to_decrypt = "zz".to_string();

    let err = sealed.client.get_encryption_key(&params).await.unwrap_err();
    assert!(matches!(err, CustodianError::Encoding { .. }));
    for node in &network.nodes {
        assert_eq!(node.retrievals(), 0);
    }
}

#[tokio::test]
async fn test_shares_reach_combiner_in_index_order() {
    let network = MockNetwork::start(5, 3).await;
    let key = vec![0x61; 32];
    let sealed = seal(&network, 3, &key).await;

    let mut urls = network.urls();
    urls.reverse();
    let mut config = ClientConfig::with_endpoints(urls, 3);
    config.handshake_timeout = TEST_TIMEOUT;
    config.request_timeout = TEST_TIMEOUT;

    let cipher = Arc::new(RecordingCipher::default());
    let mut client = CustodianClient::with_cipher(config, cipher.clone()).unwrap();
    client.connect().await.unwrap();

    let recovered = client.get_encryption_key(&sealed.params).await.unwrap();

    assert_eq!(recovered, key);
    assert_eq!(cipher.combined(), vec![vec![0, 1, 2, 3, 4]]);
}

#[tokio::test]
async fn test_combiner_order_survives_missing_shares() {
    let network = MockNetwork::start(5, 3).await;
    let key = vec![0x62; 32];
    let sealed = seal(&network, 3, &key).await;
    network.set_behavior(1, Behavior::ErrorCode);

    let mut urls = network.urls();
    urls.reverse();
    let mut config = ClientConfig::with_endpoints(urls, 3);
    config.handshake_timeout = TEST_TIMEOUT;
    config.request_timeout = TEST_TIMEOUT;

    let cipher = Arc::new(RecordingCipher::default());
    let mut client = CustodianClient::with_cipher(config, cipher.clone()).unwrap();
    client.connect().await.unwrap();

    assert_eq!(client.get_encryption_key(&sealed.params).await.unwrap(), key);
    assert_eq!(cipher.combined(), vec![vec![0, 2, 3, 4]]);
}
