// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use crate::crypto::CryptoError;

/// Operation-level failures surfaced to callers of the custodian client
#[derive(Error, Debug)]
pub enum CustodianError {
    #[error("Invalid custodian client configuration: {0}")]
    InvalidConfig(String),
    #[error("Custodian client not ready")]
    NotReady,
    #[error("Custodian quorum not reached: {connected} of {required} required nodes connected")]
    QuorumNotReached { connected: usize, required: usize },
    #[error("Insufficient decryption shares: {collected} valid, {required} required")]
    InsufficientShares { collected: usize, required: usize },
    #[error("Key not found: {0}")]
    KeyNotFound(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid node response: {0}")]
    InvalidResponse(String),
    #[error("Invalid {field}: {reason}")]
    Encoding { field: String, reason: String },
    #[error("Threshold cryptography failed: {0}")]
    Threshold(#[from] CryptoError),
}

impl CustodianError {
    pub(crate) fn encoding(field: &str, reason: impl ToString) -> Self {
        CustodianError::Encoding {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for failures caused by too few nodes answering or cooperating
    pub fn is_quorum_failure(&self) -> bool {
        matches!(
            self,
            CustodianError::NotReady
                | CustodianError::QuorumNotReached { .. }
                | CustodianError::InsufficientShares { .. }
        )
    }
}

impl From<NodeError> for CustodianError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::InvalidResponse { .. } | NodeError::Status { .. } => {
                CustodianError::InvalidResponse(err.to_string())
            }
            NodeError::Timeout { .. } | NodeError::Transport { .. } => {
                CustodianError::Transport(err.to_string())
            }
        }
    }
}

/// Failure of a single node request
///
/// Logged and counted, never fatal on its own.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("Malformed response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },
}
