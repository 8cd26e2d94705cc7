// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Read-only contract calls over JSON-RPC

use ethers::abi::Token;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest};
use std::sync::Arc;
use tracing::debug;

use super::error::ContractError;
use super::registry::ContractRegistry;
use super::value::CallValue;

pub struct ContractCaller {
    provider: Arc<Provider<Http>>,
    registry: Arc<ContractRegistry>,
}

impl ContractCaller {
    pub fn new(provider: Arc<Provider<Http>>, registry: Arc<ContractRegistry>) -> Self {
        Self { provider, registry }
    }

    pub fn from_url(rpc_url: &str, registry: Arc<ContractRegistry>) -> Result<Self, ContractError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ContractError::Provider(format!("Failed to create provider: {}", e)))?;
        Ok(Self::new(Arc::new(provider), registry))
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Target address and calldata for `contract.method(args)`
    pub fn encode_call(
        &self,
        contract: &str,
        method: &str,
        args: &[Token],
    ) -> Result<(Address, Bytes), ContractError> {
        let entry = self.registry.get(contract)?;
        let data = entry
            .function(method)?
            .encode_input(args)
            .map_err(|e| ContractError::Abi {
                method: method.to_string(),
                reason: e.to_string(),
            })?;
        Ok((entry.address, Bytes::from(data)))
    }

    /// Decode raw return data of `contract.method`
    pub fn decode_output(
        &self,
        contract: &str,
        method: &str,
        data: &[u8],
    ) -> Result<Vec<CallValue>, ContractError> {
        let tokens = self
            .registry
            .get(contract)?
            .function(method)?
            .decode_output(data)
            .map_err(|e| ContractError::Abi {
                method: method.to_string(),
                reason: e.to_string(),
            })?;
        Ok(tokens.into_iter().map(CallValue::from).collect())
    }

    /// `eth_call` against the latest block
    pub async fn call(
        &self,
        contract: &str,
        method: &str,
        args: &[Token],
    ) -> Result<Vec<CallValue>, ContractError> {
        let (to, data) = self.encode_call(contract, method, args)?;
        debug!("eth_call {}.{} at {:?}", contract, method, to);

        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| ContractError::Call {
                contract: contract.to_string(),
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        self.decode_output(contract, method, &output)
    }

    /// Call a method whose first output is a `bool`
    pub async fn call_bool(
        &self,
        contract: &str,
        method: &str,
        args: &[Token],
    ) -> Result<bool, ContractError> {
        self.call(contract, method, args)
            .await?
            .first()
            .and_then(CallValue::as_bool)
            .ok_or_else(|| ContractError::UnexpectedOutput {
                method: method.to_string(),
                expected: "bool".to_string(),
            })
    }

    /// Call a method whose first output is a `uint`
    pub async fn call_uint(
        &self,
        contract: &str,
        method: &str,
        args: &[Token],
    ) -> Result<ethers::types::U256, ContractError> {
        self.call(contract, method, args)
            .await?
            .first()
            .and_then(CallValue::as_uint)
            .ok_or_else(|| ContractError::UnexpectedOutput {
                method: method.to_string(),
                expected: "uint256".to_string(),
            })
    }
}
