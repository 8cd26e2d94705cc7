// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod error;
pub mod flow;
pub mod params;
pub mod token;

pub use error::GateError;
pub use flow::{AccessGate, NetworkKey, SealedContent, CONTENT_KEY_LEN};
pub use params::{AuthParams, MessageParams};
pub use token::{create_token, validate_token, AccessClaims};
