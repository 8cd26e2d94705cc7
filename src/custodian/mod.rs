// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Quorum client for the threshold custodian network
//!
//! Every fan-out (handshake, share retrieval, condition store) sends one
//! request per endpoint, in parallel, and waits for all of them. Individual
//! node failures are logged and counted; only quorum shortfalls escalate.

pub mod client;
pub mod error;
pub mod keys;
pub mod node;
pub mod publisher;
pub mod shares;

pub use client::{ClientConfig, CustodianClient};
pub use error::{CustodianError, NodeError};
pub use keys::{most_common, AggregateKeys, KeyName, ServerKeys};
pub use node::NodeTransport;
pub use publisher::{SaveCondParams, SaveCondResponse, SavedKey};
pub use shares::DecryptionShare;

/// Public custodian network endpoints
pub const NETWORK_NODES: [&str; 10] = [
    "https://node2.litgateway.com:7370",
    "https://node2.litgateway.com:7371",
    "https://node2.litgateway.com:7372",
    "https://node2.litgateway.com:7373",
    "https://node2.litgateway.com:7374",
    "https://node2.litgateway.com:7375",
    "https://node2.litgateway.com:7376",
    "https://node2.litgateway.com:7377",
    "https://node2.litgateway.com:7378",
    "https://node2.litgateway.com:7379",
];

pub const DEFAULT_MIN_NODE_COUNT: usize = 6;
