// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod account;
pub mod cli;
pub mod conditions;
pub mod config;
pub mod contracts;
pub mod crypto;
pub mod custodian;
pub mod gate;
pub mod storage;
pub mod version;

// Re-export main types
pub use account::{Account, AuthSig};
pub use conditions::{EncryptedKeyParams, EvmContractCondition};
pub use config::GatewayConfig;
pub use custodian::{ClientConfig, CustodianClient, CustodianError};
pub use gate::{AccessGate, AuthParams, GateError};
