// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! On-chain ownership and staking checks

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, U256};
use std::fmt;
use std::str::FromStr;

use super::caller::ContractCaller;
use super::error::ContractError;

pub const BLOCK_NFT: &str = "BUIBlockNFT";
pub const LICENSE_NFT: &str = "BUILicenseNFT";
pub const NODE_STAKING: &str = "BUINodeStaking";

pub const VERIFY_OWNER_METHOD: &str = "verifyOwner";
pub const VERIFY_STAKE_METHOD: &str = "verify";

/// Which NFT contract proves entitlement to a CID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnershipKind {
    Block,
    License,
}

impl OwnershipKind {
    pub fn contract_name(&self) -> &'static str {
        match self {
            OwnershipKind::Block => BLOCK_NFT,
            OwnershipKind::License => LICENSE_NFT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OwnershipKind::Block => "block",
            OwnershipKind::License => "license",
        }
    }
}

impl fmt::Display for OwnershipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnershipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(OwnershipKind::Block),
            "license" => Ok(OwnershipKind::License),
            other => Err(format!("Unsupported ownership type: {}", other)),
        }
    }
}

#[async_trait]
pub trait OwnershipVerifier: Send + Sync {
    /// Whether `address` owns the token minted for `cid`
    async fn verify_owner(
        &self,
        kind: OwnershipKind,
        cid: [u8; 32],
        address: Address,
    ) -> Result<bool, ContractError>;

    /// Whether `address` is a staked node
    async fn verify_stake(&self, address: Address) -> Result<bool, ContractError>;
}

/// Ownership checks against the deployed contracts
pub struct ContractOwnershipVerifier {
    caller: ContractCaller,
}

impl ContractOwnershipVerifier {
    pub fn new(caller: ContractCaller) -> Self {
        Self { caller }
    }

    pub fn caller(&self) -> &ContractCaller {
        &self.caller
    }

    pub async fn staking_cost(&self) -> Result<U256, ContractError> {
        self.caller.call_uint(NODE_STAKING, "stakingCost", &[]).await
    }

    pub async fn stake_balance(&self, address: Address) -> Result<U256, ContractError> {
        self.caller
            .call_uint(NODE_STAKING, "balance", &[Token::Address(address)])
            .await
    }

    /// Amount still needed for `address` to be fully staked
    pub async fn stake_shortfall(&self, address: Address) -> Result<U256, ContractError> {
        let cost = self.staking_cost().await?;
        let balance = self.stake_balance(address).await?;
        Ok(cost.saturating_sub(balance))
    }
}

#[async_trait]
impl OwnershipVerifier for ContractOwnershipVerifier {
    async fn verify_owner(
        &self,
        kind: OwnershipKind,
        cid: [u8; 32],
        address: Address,
    ) -> Result<bool, ContractError> {
        self.caller
            .call_bool(
                kind.contract_name(),
                VERIFY_OWNER_METHOD,
                &[Token::FixedBytes(cid.to_vec()), Token::Address(address)],
            )
            .await
    }

    async fn verify_stake(&self, address: Address) -> Result<bool, ContractError> {
        self.caller
            .call_bool(NODE_STAKING, VERIFY_STAKE_METHOD, &[Token::Address(address)])
            .await
    }
}
