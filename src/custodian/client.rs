// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Custodian network client: node registry and key consensus
//!
//! `connect` takes `&mut self`, so a client is handshaken by a single owner.
//! Once ready, every other operation only reads the connection state and can
//! run concurrently through `&self`.

use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::{CustodianError, NodeError};
use super::keys::{most_common, AggregateKeys, KeyName, ServerKeys};
use super::node::{NodeTransport, HANDSHAKE_PATH};
use super::{DEFAULT_MIN_NODE_COUNT, NETWORK_NODES};
use crate::crypto::{EciesThresholdCipher, ThresholdCipher};
use crate::version::DEFAULT_CLIENT_VERSION;

/// Public key the client presents during handshake
const CLIENT_PUBLIC_KEY: &str = "test";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Ordered custodian endpoints
    pub endpoints: Vec<String>,
    pub min_node_count: usize,
    pub client_version: String,
    pub handshake_timeout: Duration,
    /// Bound on each share/store request
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: NETWORK_NODES.iter().map(|s| s.to_string()).collect(),
            min_node_count: DEFAULT_MIN_NODE_COUNT,
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            handshake_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    pub fn with_endpoints(endpoints: Vec<String>, min_node_count: usize) -> Self {
        Self {
            endpoints,
            min_node_count,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.endpoints.is_empty() {
            return Err("At least one custodian endpoint is required".to_string());
        }
        if self.min_node_count == 0 {
            return Err("Minimum node count must be at least 1".to_string());
        }
        if self.min_node_count > self.endpoints.len() {
            return Err(format!(
                "Minimum node count {} exceeds endpoint count {}",
                self.min_node_count,
                self.endpoints.len()
            ));
        }
        for endpoint in &self.endpoints {
            url::Url::parse(endpoint)
                .map_err(|e| format!("Invalid endpoint {}: {}", endpoint, e))?;
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.endpoints.iter().find(|e| !seen.insert(e.as_str())) {
            return Err(format!("Duplicate endpoint {}", dup));
        }
        if self.request_timeout.is_zero() || self.handshake_timeout.is_zero() {
            return Err("Timeouts must be non-zero".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HandshakeRequest<'a> {
    client_public_key: &'a str,
}

/// Long-lived handle to the custodian network
pub struct CustodianClient {
    pub(crate) config: ClientConfig,
    pub(crate) transport: NodeTransport,
    pub(crate) cipher: Arc<dyn ThresholdCipher>,
    connected_nodes: HashMap<String, bool>,
    server_keys_for_node: HashMap<String, ServerKeys>,
    aggregate: Option<AggregateKeys>,
    ready: bool,
}

impl CustodianClient {
    /// Client with the default threshold cipher
    pub fn new(config: ClientConfig) -> Result<Self, CustodianError> {
        Self::with_cipher(config, Arc::new(EciesThresholdCipher))
    }

    pub fn with_cipher(
        config: ClientConfig,
        cipher: Arc<dyn ThresholdCipher>,
    ) -> Result<Self, CustodianError> {
        config.validate().map_err(CustodianError::InvalidConfig)?;
        let transport = NodeTransport::new(config.client_version.clone())?;

        Ok(Self {
            config,
            transport,
            cipher,
            connected_nodes: HashMap::new(),
            server_keys_for_node: HashMap::new(),
            aggregate: None,
            ready: false,
        })
    }

    /// Handshake every endpoint and settle the majority keys
    ///
    /// Waits for every handshake to finish or time out. Succeeds only when at
    /// least `min_node_count` endpoints answered. Previous connection state is
    /// discarded first, so a failed reconnect leaves the client not ready.
    pub async fn connect(&mut self) -> Result<(), CustodianError> {
        self.connected_nodes.clear();
        self.server_keys_for_node.clear();
        self.aggregate = None;
        self.ready = false;

        let endpoints = self.config.endpoints.clone();
        info!(
            "Connecting to {} custodian nodes (quorum {})",
            endpoints.len(),
            self.config.min_node_count
        );

        let results = {
            let handshakes: Vec<_> = endpoints.iter().map(|url| self.handshake(url)).collect();
            join_all(handshakes).await
        };

        for (url, result) in endpoints.iter().zip(results) {
            match result {
                Ok(keys) => {
                    debug!("Handshake succeeded with {}", url);
                    self.connected_nodes.insert(url.clone(), true);
                    self.server_keys_for_node.insert(url.clone(), keys);
                }
                Err(e) => {
                    warn!("Handshake failed: {}", e);
                    self.connected_nodes.insert(url.clone(), false);
                }
            }
        }

        let connected = self.connected_count();
        let required = self.config.min_node_count;
        if connected < required {
            warn!(
                "Custodian quorum not reached: {}/{} nodes connected",
                connected, required
            );
            return Err(CustodianError::QuorumNotReached { connected, required });
        }

        self.aggregate = Some(AggregateKeys {
            server_pub_key: self.most_common(KeyName::ServerPubKey)?,
            subnet_pub_key: self.most_common(KeyName::SubnetPubKey)?,
            network_pub_key: self.most_common(KeyName::NetworkPubKey)?,
            network_pub_key_set: self.most_common(KeyName::NetworkPubKeySet)?,
        });
        self.ready = true;
        info!("Custodian client ready with {} connected nodes", connected);

        Ok(())
    }

    /// Fetch one node's key bundle
    pub async fn handshake(&self, url: &str) -> Result<ServerKeys, NodeError> {
        let body = HandshakeRequest {
            client_public_key: CLIENT_PUBLIC_KEY,
        };
        self.transport
            .post(url, HANDSHAKE_PATH, &body, self.config.handshake_timeout)
            .await
    }

    /// Majority value of the named key across connected nodes
    pub fn most_common_key(&self, name: &str) -> Result<String, CustodianError> {
        let name = name
            .parse::<KeyName>()
            .map_err(CustodianError::KeyNotFound)?;
        self.most_common(name)
    }

    fn most_common(&self, name: KeyName) -> Result<String, CustodianError> {
        let bundles = self
            .connected_endpoints()
            .into_iter()
            .filter_map(|url| self.server_keys_for_node.get(url));
        most_common(bundles, name).ok_or_else(|| CustodianError::KeyNotFound(name.to_string()))
    }

    pub fn ready(&self) -> bool {
        self.ready
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn min_node_count(&self) -> usize {
        self.config.min_node_count
    }

    pub fn aggregate_keys(&self) -> Option<&AggregateKeys> {
        self.aggregate.as_ref()
    }

    pub(crate) fn ready_keys(&self) -> Result<&AggregateKeys, CustodianError> {
        match (&self.aggregate, self.ready) {
            (Some(keys), true) => Ok(keys),
            _ => Err(CustodianError::NotReady),
        }
    }

    /// Connected endpoints in configured order
    pub fn connected_endpoints(&self) -> Vec<&str> {
        self.config
            .endpoints
            .iter()
            .filter(|url| self.connected_nodes.get(url.as_str()).copied().unwrap_or(false))
            .map(String::as_str)
            .collect()
    }

    pub fn connected_count(&self) -> usize {
        self.connected_nodes.values().filter(|c| **c).count()
    }

    pub fn is_connected(&self, url: &str) -> bool {
        self.connected_nodes.get(url).copied().unwrap_or(false)
    }

    pub fn server_keys(&self, url: &str) -> Option<&ServerKeys> {
        self.server_keys_for_node.get(url)
    }
}

impl std::fmt::Debug for CustodianClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustodianClient")
            .field("config", &self.config)
            .field("connected", &self.connected_count())
            .field("ready", &self.ready)
            .finish_non_exhaustive()
    }
}
