// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP transport to a single custodian node

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::error::{CustodianError, NodeError};
use crate::version::CLIENT_VERSION_HEADER;

pub const HANDSHAKE_PATH: &str = "/web/handshake";
pub const STORE_PATH: &str = "/web/encryption/store";
pub const RETRIEVE_PATH: &str = "/web/encryption/retrieve";

/// Shared JSON POST client stamping the client version header
#[derive(Debug, Clone)]
pub struct NodeTransport {
    client: Client,
    client_version: String,
}

impl NodeTransport {
    pub fn new(client_version: impl Into<String>) -> Result<Self, CustodianError> {
        let client = Client::builder()
            .user_agent(crate::version::get_version_string())
            .build()
            .map_err(|e| CustodianError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            client_version: client_version.into(),
        })
    }

    pub fn client_version(&self) -> &str {
        &self.client_version
    }

    /// POST `body` as JSON to `{node}{path}` and decode the JSON reply
    ///
    /// `timeout` bounds the whole exchange including the response body.
    pub async fn post<B, R>(
        &self,
        node: &str,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<R, NodeError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", node.trim_end_matches('/'), path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(CLIENT_VERSION_HEADER, self.client_version.as_str())
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NodeError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| classify(&url, e))?;
        serde_json::from_slice(&bytes).map_err(|e| NodeError::InvalidResponse {
            url,
            reason: e.to_string(),
        })
    }
}

fn classify(url: &str, e: reqwest::Error) -> NodeError {
    if e.is_timeout() {
        NodeError::Timeout { url: url.to_string() }
    } else {
        NodeError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
