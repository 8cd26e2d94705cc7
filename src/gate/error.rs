// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use crate::contracts::ContractError;
use crate::crypto::CryptoError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Upstream failure: {0}")]
    Upstream(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl GateError {
    /// HTTP-equivalent status for API layers
    pub fn status_code(&self) -> u16 {
        match self {
            GateError::Unauthorized(_) => 401,
            GateError::Validation(_) => 422,
            GateError::Upstream(_) => 500,
            GateError::NotFound(_) => 404,
            GateError::Unsupported(_) => 422,
        }
    }
}

impl From<ContractError> for GateError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::NotFound(_) | ContractError::MethodNotFound { .. } => {
                GateError::NotFound(err.to_string())
            }
            _ => GateError::Upstream(err.to_string()),
        }
    }
}

impl From<StorageError> for GateError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => GateError::NotFound(err.to_string()),
            StorageError::InvalidCid(_) => GateError::Validation(err.to_string()),
            StorageError::Backend(_) => GateError::Upstream(err.to_string()),
        }
    }
}

impl From<CryptoError> for GateError {
    fn from(err: CryptoError) -> Self {
        GateError::Upstream(err.to_string())
    }
}
