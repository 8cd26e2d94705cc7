// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gateway configuration
//!
//! Environment variables (all optional):
//!
//! | Variable | Default |
//! |---|---|
//! | `GATE_CLIENT_VERSION` | [`crate::version::DEFAULT_CLIENT_VERSION`] |
//! | `GATE_MIN_NODE_COUNT` | 6 |
//! | `GATE_CUSTODIAN_NODES` | comma list, defaults to [`NETWORK_NODES`] |
//! | `GATE_REQUEST_TIMEOUT_MS` | 5000 |
//! | `GATE_HANDSHAKE_TIMEOUT_MS` | 5000 |
//! | `GATE_CHAIN_ID` | 80001 |
//! | `GATE_CONTRACTS_DIR` | unset |
//! | `GATE_SERVICE_NAME` / `GATE_SERVICE_URI` | `BlocksUI` / `https://blocksui.xyz` |
//! | `GATE_PRIVATE_KEY` | unset |
//! | `PROVIDER_URL` | unset |

pub mod chains;

pub use chains::{ChainConfig, ChainRegistry};

use std::path::PathBuf;
use std::time::Duration;

use crate::crypto::SiweDomain;
use crate::custodian::{ClientConfig, NETWORK_NODES};

#[derive(Clone)]
pub struct GatewayConfig {
    pub client: ClientConfig,
    /// Decimal chain id the node signs in on
    pub chain_id: String,
    pub provider_url: Option<String>,
    pub contracts_dir: Option<PathBuf>,
    pub domain: SiweDomain,
    /// Node account key, never logged
    pub private_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            chain_id: "80001".to_string(),
            provider_url: None,
            contracts_dir: None,
            domain: SiweDomain::default(),
            private_key: None,
        }
    }
}

impl GatewayConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(version) = std::env::var("GATE_CLIENT_VERSION") {
            config.client.client_version = version;
        }

        config.client.min_node_count = std::env::var("GATE_MIN_NODE_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.client.min_node_count);

        if let Ok(nodes) = std::env::var("GATE_CUSTODIAN_NODES") {
            let endpoints: Vec<String> = nodes
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !endpoints.is_empty() {
                config.client.endpoints = endpoints;
            }
        }

        config.client.request_timeout = std::env::var("GATE_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(config.client.request_timeout);

        config.client.handshake_timeout = std::env::var("GATE_HANDSHAKE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(config.client.handshake_timeout);

        if let Ok(chain_id) = std::env::var("GATE_CHAIN_ID") {
            config.chain_id = chain_id;
        }

        config.provider_url = std::env::var("PROVIDER_URL").ok();
        config.contracts_dir = std::env::var("GATE_CONTRACTS_DIR").ok().map(PathBuf::from);

        if let Ok(service) = std::env::var("GATE_SERVICE_NAME") {
            config.domain.service = service;
        }
        if let Ok(uri) = std::env::var("GATE_SERVICE_URI") {
            config.domain.uri = uri;
        }

        config.private_key = std::env::var("GATE_PRIVATE_KEY").ok();

        config
    }

    pub fn validate(&self) -> Result<(), String> {
        self.client.validate()?;

        if ChainRegistry::new().name_for_id(&self.chain_id).is_none() {
            return Err(format!("Unsupported chain id: {}", self.chain_id));
        }

        if let Some(url) = &self.provider_url {
            url::Url::parse(url).map_err(|e| format!("Invalid PROVIDER_URL: {}", e))?;
        }

        Ok(())
    }

    /// Condition chain name for the configured chain id
    pub fn chain_name(&self) -> Option<String> {
        ChainRegistry::new()
            .name_for_id(&self.chain_id)
            .map(str::to_string)
    }

    pub fn uses_public_network(&self) -> bool {
        self.client.endpoints.len() == NETWORK_NODES.len()
            && self
                .client
                .endpoints
                .iter()
                .zip(NETWORK_NODES.iter())
                .all(|(a, b)| a == b)
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("client", &self.client)
            .field("chain_id", &self.chain_id)
            .field("provider_url", &self.provider_url)
            .field("contracts_dir", &self.contracts_dir)
            .field("domain", &self.domain)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
