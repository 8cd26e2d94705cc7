// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod caller;
pub mod error;
pub mod ownership;
pub mod registry;
pub mod value;

pub use caller::ContractCaller;
pub use error::ContractError;
pub use ownership::{
    ContractOwnershipVerifier, OwnershipKind, OwnershipVerifier, BLOCK_NFT, LICENSE_NFT,
    NODE_STAKING, VERIFY_OWNER_METHOD, VERIFY_STAKE_METHOD,
};
pub use registry::{ContractEntry, ContractRegistry};
pub use value::CallValue;
