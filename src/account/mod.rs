// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wallet session
//!
//! Wraps the node's signing wallet and produces sign-in AuthSigs. Signed
//! AuthSigs are cached in memory per `(chain, statement)` so identical
//! requests within a session are not re-signed.
//!
//! **Security**: the private key and cached signatures live in memory only.

pub mod auth_sig;

pub use auth_sig::{AuthSig, DERIVED_VIA_PERSONAL_SIGN};

use anyhow::{anyhow, Result};
use chrono::{SecondsFormat, Utc};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::crypto::SiweDomain;

#[derive(Clone)]
pub struct Account {
    wallet: LocalWallet,
    domain: SiweDomain,
    auth_sigs: Arc<RwLock<HashMap<(String, String), AuthSig>>>,
}

impl Account {
    pub fn new(wallet: LocalWallet) -> Self {
        Self {
            wallet,
            domain: SiweDomain::default(),
            auth_sigs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load from a hex private key (with or without `0x`)
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let wallet = private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| anyhow!("Invalid private key: {}", e))?;
        Ok(Self::new(wallet))
    }

    /// Fresh throwaway wallet
    pub fn random() -> Self {
        Self::new(LocalWallet::new(&mut OsRng))
    }

    pub fn with_domain(mut self, domain: SiweDomain) -> Self {
        self.domain = domain;
        self
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn domain(&self) -> &SiweDomain {
        &self.domain
    }

    /// `personal_sign` `message`, returning the `0x` hex signature
    pub async fn sign_message(&self, message: &str) -> Result<String> {
        let signature = self
            .wallet
            .sign_message(message)
            .await
            .map_err(|e| anyhow!("Failed to sign message: {}", e))?;
        Ok(format!("0x{}", hex::encode(signature.to_vec())))
    }

    /// Sign-in AuthSig for `chain_id` carrying `statement`
    ///
    /// Returns the cached AuthSig when the same pair was signed before.
    pub async fn siwe(&self, chain_id: &str, statement: &str) -> Result<AuthSig> {
        let cache_key = (chain_id.to_string(), statement.to_string());
        if let Some(auth_sig) = self.auth_sigs.read().await.get(&cache_key) {
            return Ok(auth_sig.clone());
        }

        let now = Utc::now();
        let message = self.domain.message(
            &self.address(),
            statement,
            chain_id,
            &now.timestamp().to_string(),
            &now.to_rfc3339_opts(SecondsFormat::Secs, true),
        );

        let auth_sig = AuthSig {
            sig: self.sign_message(&message).await?,
            derived_via: DERIVED_VIA_PERSONAL_SIGN.to_string(),
            signed_message: message,
            address: format!("{:?}", self.address()),
        };

        let mut auth_sigs = self.auth_sigs.write().await;
        let auth_sig = auth_sigs.entry(cache_key).or_insert(auth_sig).clone();
        tracing::debug!(
            "AuthSig ready for chain {} (cached signatures: {})",
            chain_id,
            auth_sigs.len()
        );

        Ok(auth_sig)
    }

    /// Drop all cached AuthSigs, forcing re-signing
    pub async fn clear_auth_sigs(&self) {
        self.auth_sigs.write().await.clear();
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
