// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node public key bundles and majority consensus over them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Public key bundle a node reports during handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerKeys {
    #[serde(rename = "serverPublicKey")]
    pub server_pub_key: String,
    #[serde(rename = "subnetPublicKey")]
    pub subnet_pub_key: String,
    #[serde(rename = "networkPublicKey")]
    pub network_pub_key: String,
    #[serde(rename = "networkPublicKeySet")]
    pub network_pub_key_set: String,
}

impl ServerKeys {
    pub fn key(&self, name: KeyName) -> &str {
        match name {
            KeyName::ServerPubKey => &self.server_pub_key,
            KeyName::SubnetPubKey => &self.subnet_pub_key,
            KeyName::NetworkPubKey => &self.network_pub_key,
            KeyName::NetworkPubKeySet => &self.network_pub_key_set,
        }
    }
}

/// The four named keys of a [`ServerKeys`] bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyName {
    ServerPubKey,
    SubnetPubKey,
    NetworkPubKey,
    NetworkPubKeySet,
}

impl KeyName {
    pub const ALL: [KeyName; 4] = [
        KeyName::ServerPubKey,
        KeyName::SubnetPubKey,
        KeyName::NetworkPubKey,
        KeyName::NetworkPubKeySet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyName::ServerPubKey => "ServerPubKey",
            KeyName::SubnetPubKey => "SubnetPubKey",
            KeyName::NetworkPubKey => "NetworkPubKey",
            KeyName::NetworkPubKeySet => "NetworkPubKeySet",
        }
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Majority-agreed keys across the connected nodes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregateKeys {
    pub server_pub_key: String,
    pub subnet_pub_key: String,
    pub network_pub_key: String,
    pub network_pub_key_set: String,
}

/// Value reported by the most bundles
///
/// Ties go to the value seen first in iteration order. Returns `None` for an
/// empty input.
pub fn most_common<'a, I>(bundles: I, name: KeyName) -> Option<String>
where
    I: IntoIterator<Item = &'a ServerKeys>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for bundle in bundles {
        let value = bundle.key(name);
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}
