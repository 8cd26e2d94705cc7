// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wallet Signature Recovery
//!
//! Recovers the Ethereum address that produced a `personal_sign` signature.
//! This backs local authentication of requesters: the recovered address must
//! equal the address the requester claims.

use anyhow::{anyhow, Result};
use ethers::types::Address;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use tiny_keccak::{Hasher, Keccak};

/// Personal-message signing prefix (EIP-191, version 0x45)
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Build the exact byte sequence a wallet hashes for `personal_sign`
///
/// `"\x19Ethereum Signed Message:\n" + decimal byte length + message`
pub fn eip191_bytes(message: &str) -> Vec<u8> {
    let len = message.len().to_string();
    let mut bytes = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + len.len() + message.len());
    bytes.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    bytes.extend_from_slice(len.as_bytes());
    bytes.extend_from_slice(message.as_bytes());
    bytes
}

/// Keccak-256 digest
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut hash);
    hash
}

/// Recover the signer of `message` from a hex `0x`-prefixed 65-byte signature
///
/// The trailing recovery byte follows the custodian network's convention:
/// `28` is read as `1`; `27` is read as `0`; `0..=3` are used as-is.
///
/// # Errors
///
/// Returns error if:
/// - Signature is not valid hex or not exactly 65 bytes
/// - Recovery ID is invalid after normalization
/// - Public key recovery fails
pub fn recover_address(signature: &str, message: &str) -> Result<Address> {
    let sig_hex = signature.strip_prefix("0x").unwrap_or(signature);
    let sig = hex::decode(sig_hex).map_err(|e| anyhow!("Signature is not valid hex: {}", e))?;

    let hash = keccak256(&eip191_bytes(message));
    recover_from_prehash(&sig, &hash)
}

/// Recover an Ethereum address from a 65-byte `r || s || v` signature over `message_hash`
pub fn recover_from_prehash(signature: &[u8], message_hash: &[u8]) -> Result<Address> {
    if signature.len() != 65 {
        return Err(anyhow!(
            "Invalid signature size: expected 65 bytes, got {}",
            signature.len()
        ));
    }

    if message_hash.len() != 32 {
        return Err(anyhow!(
            "Invalid message hash size: expected 32 bytes, got {}",
            message_hash.len()
        ));
    }

    let recovery_id = match signature[64] {
        28 => 1,
        27 => 0,
        v => v,
    };

    if recovery_id > 3 {
        return Err(anyhow!("Invalid recovery ID: expected 0-3, got {}", recovery_id));
    }

    let recovery_id = RecoveryId::try_from(recovery_id)
        .map_err(|e| anyhow!("Failed to create recovery ID: {}", e))?;

    let signature = Signature::try_from(&signature[..64])
        .map_err(|e| anyhow!("Failed to parse signature: {}", e))?;

    let verifying_key = VerifyingKey::recover_from_prehash(message_hash, &signature, recovery_id)
        .map_err(|e| anyhow!("Failed to recover public key: {}", e))?;

    Ok(verifying_key_to_address(&verifying_key))
}

/// Derive the Ethereum address of a secp256k1 public key
pub fn verifying_key_to_address(key: &VerifyingKey) -> Address {
    let public_key = key.to_encoded_point(false);
    // Skip the 0x04 prefix, address is the last 20 bytes of the digest
    let hash = keccak256(&public_key.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
