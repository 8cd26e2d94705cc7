// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Typed view of contract call results

use ethers::abi::Token;
use ethers::types::{Address, I256, U256};

/// A decoded ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallValue {
    Bool(bool),
    Uint(U256),
    Int(I256),
    Address(Address),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    Array(Vec<CallValue>),
    Tuple(Vec<CallValue>),
}

impl From<Token> for CallValue {
    fn from(token: Token) -> Self {
        match token {
            Token::Bool(b) => CallValue::Bool(b),
            Token::Uint(u) => CallValue::Uint(u),
            Token::Int(i) => CallValue::Int(I256::from_raw(i)),
            Token::Address(a) => CallValue::Address(a),
            Token::String(s) => CallValue::String(s),
            Token::Bytes(b) => CallValue::Bytes(b),
            Token::FixedBytes(b) => CallValue::FixedBytes(b),
            Token::Array(items) | Token::FixedArray(items) => {
                CallValue::Array(items.into_iter().map(CallValue::from).collect())
            }
            Token::Tuple(items) => CallValue::Tuple(items.into_iter().map(CallValue::from).collect()),
        }
    }
}

impl CallValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CallValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            CallValue::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            CallValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// Name of the ABI kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            CallValue::Bool(_) => "bool",
            CallValue::Uint(_) => "uint",
            CallValue::Int(_) => "int",
            CallValue::Address(_) => "address",
            CallValue::String(_) => "string",
            CallValue::Bytes(_) => "bytes",
            CallValue::FixedBytes(_) => "fixed bytes",
            CallValue::Array(_) => "array",
            CallValue::Tuple(_) => "tuple",
        }
    }
}
