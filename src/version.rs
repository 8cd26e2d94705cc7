// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the threshold access gate

/// Full version string with feature description
pub const VERSION: &str = "v0.3.0-threshold-gate-2025-10-13";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.3.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-13";

/// Header carrying the client version on every custodian request
pub const CLIENT_VERSION_HEADER: &str = "lit-js-sdk-version";

/// Client version custodian nodes are known to accept
pub const DEFAULT_CLIENT_VERSION: &str = "1.1.250";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "custodian-handshake",
    "majority-key-consensus",
    "threshold-decryption",
    "conditional-key-storage",
    "siwe-auth-sigs",
    "block-authorization",
    "cid-bytes32",
];

/// Supported chain IDs
pub const SUPPORTED_CHAINS: &[u64] = &[
    1,     // Ethereum
    137,   // Polygon
    80001, // Mumbai
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Threshold Gate {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for diagnostics
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "clientVersion": DEFAULT_CLIENT_VERSION,
        "features": FEATURES,
        "chains": SUPPORTED_CHAINS,
    })
}
