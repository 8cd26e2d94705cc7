// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CID ↔ bytes32 conversion
//!
//! Contracts key tokens by the raw sha2-256 digest of the content's CID, so
//! only sha2-256 CIDs round-trip.

use cid::Cid;
use multihash::Multihash;
use sha2::{Digest, Sha256};

use super::error::StorageError;

/// Multicodec code of sha2-256
pub const SHA2_256: u64 = 0x12;

/// `0x`-prefixed hex of the CID's sha2-256 digest
pub fn cid_to_bytes32(cid: &str) -> Result<String, StorageError> {
    Ok(format!("0x{}", hex::encode(cid_digest(cid)?)))
}

/// Raw sha2-256 digest of a CID
pub fn cid_digest(cid: &str) -> Result<[u8; 32], StorageError> {
    let parsed = Cid::try_from(cid).map_err(|e| StorageError::InvalidCid(format!("{}: {}", cid, e)))?;
    let hash = parsed.hash();
    if hash.code() != SHA2_256 {
        return Err(StorageError::InvalidCid(format!(
            "{}: unsupported hash code 0x{:x}",
            cid,
            hash.code()
        )));
    }

    hash.digest()
        .try_into()
        .map_err(|_| StorageError::InvalidCid(format!("{}: digest is not 32 bytes", cid)))
}

/// CIDv0 for a `0x`-prefixed (or bare) hex digest
pub fn bytes32_to_cid(bytes32: &str) -> Result<String, StorageError> {
    let digest = hex::decode(bytes32.trim_start_matches("0x"))
        .map_err(|e| StorageError::InvalidCid(format!("{}: {}", bytes32, e)))?;
    if digest.len() != 32 {
        return Err(StorageError::InvalidCid(format!(
            "{}: expected 32 bytes, got {}",
            bytes32,
            digest.len()
        )));
    }
    digest_to_cid(&digest)
}

/// CIDv0 addressing `data`
pub fn content_cid(data: &[u8]) -> Result<String, StorageError> {
    digest_to_cid(&Sha256::digest(data))
}

fn digest_to_cid(digest: &[u8]) -> Result<String, StorageError> {
    let hash = Multihash::<64>::wrap(SHA2_256, digest)
        .map_err(|e| StorageError::InvalidCid(e.to_string()))?;
    let cid = Cid::new_v0(hash).map_err(|e| StorageError::InvalidCid(e.to_string()))?;
    Ok(cid.to_string())
}
