// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Access tokens
//!
//! HS256 JWTs signed with the network key:
//! - `sub` = `chain:type:tokenId:cid`
//! - `iss` = `address:signature`
//! - `aud` = origin
//! - `nbf` = issue date as unix seconds

use chrono::{DateTime, SecondsFormat, Utc};
use ethers::types::Address;
use ethers::utils::to_checksum;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use super::error::GateError;
use super::params::AuthParams;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub nbf: i64,
}

impl AccessClaims {
    pub fn from_params(params: &AuthParams) -> Result<Self, GateError> {
        let issued_at = params.message_params().issued_at()?;
        Ok(Self {
            sub: [
                params.chain.as_str(),
                params.kind.as_str(),
                params.token_id.as_str(),
                params.cid.as_str(),
            ]
            .join(":"),
            iss: format!("{}:{}", to_checksum(&params.address, None), params.signature),
            aud: params.origin.clone(),
            nbf: issued_at.timestamp(),
        })
    }

    /// Reverse of [`AccessClaims::from_params`]
    ///
    /// The issue date comes back as UTC with second precision.
    pub fn into_params(self) -> Result<AuthParams, GateError> {
        let mut sub = self.sub.splitn(4, ':');
        let (chain, kind, token_id, cid) = match (sub.next(), sub.next(), sub.next(), sub.next()) {
            (Some(chain), Some(kind), Some(token_id), Some(cid)) => (chain, kind, token_id, cid),
            _ => return Err(GateError::Validation(format!("Malformed sub claim: {}", self.sub))),
        };

        let (address, signature) = self
            .iss
            .split_once(':')
            .ok_or_else(|| GateError::Validation(format!("Malformed iss claim: {}", self.iss)))?;
        let address = Address::from_str(address)
            .map_err(|e| GateError::Validation(format!("iss address {}: {}", address, e)))?;

        let issue_date = DateTime::<Utc>::from_timestamp(self.nbf, 0)
            .ok_or_else(|| GateError::Validation(format!("nbf out of range: {}", self.nbf)))?
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        Ok(AuthParams {
            address,
            cid: cid.to_string(),
            chain: chain.to_string(),
            issue_date,
            origin: self.aud,
            signature: signature.to_string(),
            kind: kind.to_string(),
            token_id: token_id.to_string(),
        })
    }
}

/// Issue an access token for authorized `params`
pub fn create_token(params: &AuthParams, key: &[u8]) -> Result<String, GateError> {
    let claims = AccessClaims::from_params(params)?;
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(key),
    )
    .map_err(|e| GateError::Upstream(format!("Failed to sign token: {}", e)))
}

/// Verify `token` against `key` and recover its params
///
/// Tokens carry no expiry. `nbf` is enforced.
pub fn validate_token(token: &str, key: &[u8]) -> Result<AuthParams, GateError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims = HashSet::new();
    validation.validate_exp = false;
    validation.validate_nbf = true;
    validation.validate_aud = false;

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(key), &validation)
        .map_err(|e| GateError::Unauthorized(format!("Invalid token: {}", e)))?;
    data.claims.into_params()
}
