// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Access condition model
//!
//! An access condition describes an on-chain boolean check. Custodian nodes
//! re-run the check themselves before releasing a decryption share.

pub mod abi;
pub mod types;

pub use abi::{AbiIo, AbiMember};
pub use types::{
    condition_hash, EncryptedKeyParams, EvmContractCondition, ReturnValueTest,
    USER_ADDRESS_PLACEHOLDER,
};
