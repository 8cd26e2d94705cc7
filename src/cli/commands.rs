// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Args;
use ethers::types::Address;
use ethers::utils::to_checksum;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::GatewayConfig;
use crate::crypto::recover_address;
use crate::custodian::{CustodianClient, KeyName};
use crate::gate::{validate_token, GateError};

/// Arguments for handshake command
#[derive(Args, Debug)]
pub struct HandshakeArgs {
    /// Comma-separated custodian endpoints (defaults to the public network)
    #[arg(long, value_delimiter = ',', env = "GATE_CUSTODIAN_NODES")]
    pub nodes: Vec<String>,

    /// Minimum number of nodes that must respond
    #[arg(long, env = "GATE_MIN_NODE_COUNT")]
    pub min_nodes: Option<usize>,

    /// Per-node handshake timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Arguments for recover command
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// Message that was signed (personal_sign)
    #[arg(long)]
    pub message: String,

    /// 0x-prefixed 65 byte signature
    #[arg(long)]
    pub signature: String,

    /// Fail unless the signer is this address
    #[arg(long)]
    pub expect: Option<String>,
}

/// Arguments for token-info command
#[derive(Args, Debug)]
pub struct TokenInfoArgs {
    /// Access token (JWT)
    #[arg(long)]
    pub token: String,

    /// Hex network key the token was signed with
    #[arg(long)]
    pub key: String,
}

/// Connect to the custodian network and print the agreed keys
pub async fn handshake(args: HandshakeArgs) -> Result<()> {
    let mut config = GatewayConfig::from_env().client;
    if !args.nodes.is_empty() {
        config.endpoints = args.nodes;
    }
    if let Some(min_nodes) = args.min_nodes {
        config.min_node_count = min_nodes;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.handshake_timeout = Duration::from_millis(timeout_ms);
    }

    let total = config.endpoints.len();
    let mut client = CustodianClient::new(config)?;
    info!("Connecting to {} custodian nodes", total);
    client.connect().await?;

    println!("✅ Connected to {}/{} nodes", client.connected_count(), total);
    for url in client.connected_endpoints() {
        println!("   {}", url);
    }
    println!();
    for name in KeyName::ALL {
        println!("{}: {}", name, client.most_common_key(name.as_str())?);
    }

    Ok(())
}

/// Print the address that signed a message
pub async fn recover(args: RecoverArgs) -> Result<()> {
    let signer = recover_address(&args.signature, &args.message)?;
    println!("{}", to_checksum(&signer, None));

    if let Some(expected) = args.expect {
        let expected = Address::from_str(&expected)
            .map_err(|e| anyhow!("Invalid --expect address {}: {}", expected, e))?;
        if signer != expected {
            return Err(GateError::Unauthorized(format!(
                "signer {:?} is not {:?}",
                signer, expected
            ))
            .into());
        }
        println!("✅ Signature matches");
    }

    Ok(())
}

/// Verify an access token and print its params
pub async fn token_info(args: TokenInfoArgs) -> Result<()> {
    let key = hex::decode(args.key.trim_start_matches("0x"))
        .map_err(|e| anyhow!("Invalid --key: {}", e))?;
    let params = validate_token(&args.token, &key)?;

    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}
