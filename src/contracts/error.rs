// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Contract not registered: {0}")]
    NotFound(String),
    #[error("Method {method} not found on {contract}")]
    MethodNotFound { contract: String, method: String },
    #[error("Invalid contract document: {0}")]
    InvalidDocument(String),
    #[error("ABI encoding failed for {method}: {reason}")]
    Abi { method: String, reason: String },
    #[error("Call to {contract}.{method} failed: {reason}")]
    Call {
        contract: String,
        method: String,
        reason: String,
    },
    #[error("Unexpected output from {method}: expected {expected}")]
    UnexpectedOutput { method: String, expected: String },
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
