// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Requester authorization through the full gate flow

use chrono::{SecondsFormat, Utc};

use crate::common::{Behavior, GateFixture};
use threshold_gate::account::Account;
use threshold_gate::contracts::OwnershipKind;
use threshold_gate::crypto::authorization_statement;
use threshold_gate::gate::{AuthParams, GateError, MessageParams, NetworkKey};

const ORIGIN: &str = "https://blocks.example";

fn cid() -> String {
    format!("0x{}", "a1".repeat(32))
}

fn message_params(requester: &Account) -> MessageParams {
    MessageParams {
        address: requester.address(),
        cid: cid(),
        chain: "80001".to_string(),
        issue_date: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        origin: ORIGIN.to_string(),
    }
}

async fn signed_params(fixture: &GateFixture, requester: &Account, kind: &str) -> AuthParams {
    let params = message_params(requester);
    let message = fixture.gate.sign_message(&params).await.unwrap();
    let signature = requester.sign_message(&message).await.unwrap();

    AuthParams {
        address: params.address,
        cid: params.cid,
        chain: params.chain,
        issue_date: params.issue_date,
        origin: params.origin,
        signature,
        kind: kind.to_string(),
        token_id: "1".to_string(),
    }
}

#[tokio::test]
async fn test_authenticate_node_recovers_network_key() {
    let fixture = GateFixture::start().await;

    let key = fixture.gate.authenticate_node().await.unwrap();
    assert_eq!(key, NetworkKey::new(fixture.network_key.clone()));
    assert!(fixture.gate.node_is_staked().await.unwrap());
}

#[tokio::test]
async fn test_unstaked_node_is_refused() {
    let fixture = GateFixture::start().await;
    fixture.network.restrict();

    assert!(matches!(
        fixture.gate.authenticate_node().await,
        Err(GateError::Unauthorized(_))
    ));

    fixture.network.grant("verify", fixture.node.address());
    assert!(fixture.gate.authenticate_node().await.is_ok());
}

#[tokio::test]
async fn test_node_quorum_loss_is_upstream_failure() {
    let fixture = GateFixture::start().await;
    for index in 0..3 {
        fixture.network.set_behavior(index, Behavior::Down);
    }

    assert!(matches!(
        fixture.gate.authenticate_node().await,
        Err(GateError::Upstream(_))
    ));
}

#[tokio::test]
async fn test_sign_message_embeds_authorization_statement() {
    let fixture = GateFixture::start().await;
    let requester = Account::random();
    let params = message_params(&requester);

    let message = fixture.gate.sign_message(&params).await.unwrap();

    let statement = authorization_statement(&fixture.network_key, &params.cid, ORIGIN).unwrap();
    assert!(message.starts_with("BlocksUI wants you to sign in with your Ethereum account:\n"));
    assert!(message.contains(&statement));
    assert!(message.contains("Chain ID: 80001"));
    assert!(message.contains(&format!("Issued At: {}", params.issue_date)));
}

#[tokio::test]
async fn test_authorize_issues_token_for_owner() {
    let fixture = GateFixture::start().await;
    let requester = Account::random();
    let params = signed_params(&fixture, &requester, "license").await;
    fixture
        .verifier
        .add_owner(OwnershipKind::License, [0xa1; 32], requester.address());

    let token = fixture.gate.authorize(&params).await.unwrap();

    let key = NetworkKey::new(fixture.network_key.clone());
    let recovered = fixture.gate.validate_token(&token, &key).unwrap();
    assert_eq!(recovered, params);
}

#[tokio::test]
async fn test_authorize_rejects_non_owner() {
    let fixture = GateFixture::start().await;
    let requester = Account::random();
    let params = signed_params(&fixture, &requester, "block").await;

    assert!(matches!(
        fixture.gate.authorize(&params).await,
        Err(GateError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_authorize_rejects_signature_from_other_wallet() {
    let fixture = GateFixture::start().await;
    let requester = Account::random();
    let impostor = Account::random();
    let mut params = signed_params(&fixture, &impostor, "block").await;
    params.address = requester.address();
    fixture
        .verifier
        .add_owner(OwnershipKind::Block, [0xa1; 32], requester.address());

    let err = fixture.gate.authorize(&params).await.unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_authorize_rejects_changed_origin() {
    let fixture = GateFixture::start().await;
    let requester = Account::random();
    let mut params = signed_params(&fixture, &requester, "block").await;
    fixture
        .verifier
        .add_owner(OwnershipKind::Block, [0xa1; 32], requester.address());
    params.origin = "https://phish.example".to_string();

    assert!(matches!(
        fixture.gate.authorize(&params).await,
        Err(GateError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_authorize_rejects_unknown_kind() {
    let fixture = GateFixture::start().await;
    let requester = Account::random();
    let params = signed_params(&fixture, &requester, "album").await;

    let err = fixture.gate.authorize(&params).await.unwrap_err();
    assert!(matches!(err, GateError::Unsupported(_)));
    assert_eq!(err.status_code(), 422);
}

#[tokio::test]
async fn test_token_from_other_network_key_is_rejected() {
    let fixture = GateFixture::start().await;
    let requester = Account::random();
    let params = signed_params(&fixture, &requester, "block").await;
    fixture
        .verifier
        .add_owner(OwnershipKind::Block, [0xa1; 32], requester.address());

    let token = fixture.gate.authorize(&params).await.unwrap();
    let other = NetworkKey::new(vec![0u8; 32]);
    assert!(matches!(
        fixture.gate.validate_token(&token, &other),
        Err(GateError::Unauthorized(_))
    ));
}
