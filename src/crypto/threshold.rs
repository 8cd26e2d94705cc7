// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Threshold Key Encapsulation
//!
//! The custodian network holds a secret key `sk` split into Shamir shares
//! `sk_i`, one per node. Symmetric content keys are encrypted to the network
//! public key `P = sk * G` and can only be opened once a quorum of nodes each
//! contribute a partial decryption.
//!
//! **Ciphertext Format**:
//! ```text
//! [ephemeral R (33 bytes, compressed) | nonce (24 bytes) | XChaCha20-Poly1305 ciphertext+tag]
//! ```
//!
//! **Public Key Set Format**:
//! ```text
//! [threshold (1 byte) | P (33 bytes, compressed)]
//! ```
//!
//! ## Threshold decryption
//!
//! 1. Node `i` returns the partial ECDH point `S_i = sk_i * R`
//! 2. The client interpolates `S = sum(lambda_i * S_i) = sk * R`
//! 3. `key = HKDF-SHA256(R || S)` opens the AEAD payload
//!
//! Share `i` sits at x-coordinate `i + 1` of the sharing polynomial.
//!
//! The [`ThresholdCipher`] trait is the seam: any scheme compatible with the
//! network's key ceremony can replace [`EciesThresholdCipher`].

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use hkdf::Hkdf;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::Field;
use k256::{NonZeroScalar, ProjectivePoint, PublicKey, Scalar};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use std::collections::HashSet;

use super::error::CryptoError;

const POINT_SIZE: usize = 33;
const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;
const KDF_INFO: &[u8] = b"threshold-gate/key-encapsulation/v1";

/// One node's partial decryption, tagged with its share index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedShare {
    pub index: u8,
    pub share: Vec<u8>,
}

/// Pluggable threshold encryption / share combination primitive
///
/// `combine` must be deterministic for a given ordered share set and return
/// the same plaintext for every superset of valid shares at or above the
/// threshold.
pub trait ThresholdCipher: Send + Sync {
    /// Encrypt `message` to the network (subnet) public key
    fn encrypt(&self, subnet_public_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Recover the plaintext of `ciphertext` from ordered decryption shares
    fn combine(
        &self,
        shares: &[IndexedShare],
        ciphertext: &[u8],
        public_key_set: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;
}

/// Threshold ECIES over secp256k1
#[derive(Debug, Clone, Copy, Default)]
pub struct EciesThresholdCipher;

impl ThresholdCipher for EciesThresholdCipher {
    fn encrypt(&self, subnet_public_key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let network_key = parse_point(subnet_public_key, "subnet_public_key")?;

        let ephemeral = NonZeroScalar::random(&mut OsRng);
        let r = ProjectivePoint::GENERATOR * *ephemeral;
        let s = network_key * *ephemeral;

        let r_bytes = compress(&r);
        let key = derive_key(&r_bytes, &compress(&s))?;

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let cipher = XChaCha20Poly1305::new_from_slice(&key).map_err(|e| {
            CryptoError::EncryptionFailed {
                operation: "threshold_encrypt".to_string(),
                reason: e.to_string(),
            }
        })?;
        let sealed = cipher
            .encrypt(XNonce::from_slice(&nonce), message)
            .map_err(|e| CryptoError::EncryptionFailed {
                operation: "threshold_encrypt".to_string(),
                reason: e.to_string(),
            })?;

        let mut out = Vec::with_capacity(POINT_SIZE + NONCE_SIZE + sealed.len());
        out.extend_from_slice(&r_bytes);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn combine(
        &self,
        shares: &[IndexedShare],
        ciphertext: &[u8],
        public_key_set: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let key_set = PublicKeySet::from_bytes(public_key_set)?;
        if shares.len() < key_set.threshold as usize {
            return Err(CryptoError::InsufficientShares {
                provided: shares.len(),
                required: key_set.threshold as usize,
            });
        }

        let (r_bytes, nonce, sealed) = split_ciphertext(ciphertext)?;

        let mut seen = HashSet::new();
        let mut points = Vec::with_capacity(shares.len());
        for share in shares {
            if !seen.insert(share.index) {
                return Err(CryptoError::InvalidShare {
                    index: share.index,
                    reason: "duplicate share index".to_string(),
                });
            }
            let point = parse_point(&share.share, "decryption_share").map_err(|e| {
                CryptoError::InvalidShare {
                    index: share.index,
                    reason: e.to_string(),
                }
            })?;
            points.push((share_x(share.index), point));
        }

        let xs: Vec<Scalar> = points.iter().map(|(x, _)| *x).collect();
        let mut shared = ProjectivePoint::IDENTITY;
        for (i, (_, point)) in points.iter().enumerate() {
            shared += *point * lagrange_at_zero(&xs, i)?;
        }

        let key = derive_key(r_bytes, &compress(&shared))?;
        let cipher = XChaCha20Poly1305::new_from_slice(&key).map_err(|e| {
            CryptoError::DecryptionFailed {
                operation: "threshold_combine".to_string(),
                reason: e.to_string(),
            }
        })?;

        cipher
            .decrypt(XNonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::DecryptionFailed {
                operation: "threshold_combine".to_string(),
                reason: "combined key did not open the ciphertext".to_string(),
            })
    }
}

/// Threshold and group public key published by the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeySet {
    pub threshold: u8,
    pub public_key: Vec<u8>,
}

impl PublicKeySet {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.public_key.len());
        out.push(self.threshold);
        out.extend_from_slice(&self.public_key);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 1 + POINT_SIZE {
            return Err(CryptoError::InvalidKey {
                key_type: "network_public_key_set".to_string(),
                reason: format!("expected {} bytes, got {}", 1 + POINT_SIZE, bytes.len()),
            });
        }
        if bytes[0] == 0 {
            return Err(CryptoError::InvalidKey {
                key_type: "network_public_key_set".to_string(),
                reason: "threshold must be at least 1".to_string(),
            });
        }
        parse_point(&bytes[1..], "network_public_key_set")?;

        Ok(Self {
            threshold: bytes[0],
            public_key: bytes[1..].to_vec(),
        })
    }
}

/// A node's secret share of the network key
///
/// Held by custodian nodes, never by clients. Exposed for key ceremonies in
/// development networks and for tests.
#[derive(Clone)]
pub struct SecretKeyShare {
    pub index: u8,
    secret: Scalar,
}

impl std::fmt::Debug for SecretKeyShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKeyShare")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl SecretKeyShare {
    /// Compute this node's partial decryption `sk_i * R` of a ciphertext
    pub fn decryption_share(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let (r_bytes, _, _) = split_ciphertext(ciphertext)?;
        let r = parse_point(r_bytes, "ephemeral_public_key")?;
        Ok(compress(&(r * self.secret)))
    }
}

/// Output of a trusted-dealer key ceremony
#[derive(Debug, Clone)]
pub struct DealtKeys {
    pub public_key_set: PublicKeySet,
    pub shares: Vec<SecretKeyShare>,
}

impl DealtKeys {
    /// Compressed network public key, hex encoded
    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key_set.public_key)
    }

    /// Serialized public key set, hex encoded
    pub fn public_key_set_hex(&self) -> String {
        hex::encode(self.public_key_set.to_bytes())
    }
}

/// Split a fresh network key into `total` shares with reconstruction threshold `threshold`
pub fn deal(threshold: u8, total: u8) -> Result<DealtKeys, CryptoError> {
    if threshold == 0 || threshold > total {
        return Err(CryptoError::Other(format!(
            "invalid sharing parameters: threshold {} of {}",
            threshold, total
        )));
    }

    let coefficients: Vec<Scalar> = (0..threshold).map(|_| Scalar::random(&mut OsRng)).collect();
    let public_key = compress(&(ProjectivePoint::GENERATOR * coefficients[0]));

    let shares = (0..total)
        .map(|index| {
            let x = share_x(index);
            // Horner evaluation of the sharing polynomial at x
            let secret = coefficients
                .iter()
                .rev()
                .fold(Scalar::ZERO, |acc, c| acc * x + c);
            SecretKeyShare { index, secret }
        })
        .collect();

    Ok(DealtKeys {
        public_key_set: PublicKeySet {
            threshold,
            public_key,
        },
        shares,
    })
}

fn share_x(index: u8) -> Scalar {
    Scalar::from(u64::from(index) + 1)
}

/// Lagrange basis polynomial `i` evaluated at zero over the points `xs`
fn lagrange_at_zero(xs: &[Scalar], i: usize) -> Result<Scalar, CryptoError> {
    let mut numerator = Scalar::ONE;
    let mut denominator = Scalar::ONE;
    for (j, xj) in xs.iter().enumerate() {
        if j == i {
            continue;
        }
        numerator *= xj;
        denominator *= *xj - xs[i];
    }

    let inverse: Option<Scalar> = denominator.invert().into();
    inverse
        .map(|inv| numerator * inv)
        .ok_or_else(|| CryptoError::Other("share x-coordinates are not distinct".to_string()))
}

fn split_ciphertext(ciphertext: &[u8]) -> Result<(&[u8], &[u8], &[u8]), CryptoError> {
    if ciphertext.len() < POINT_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidPayload {
            field: "to_decrypt".to_string(),
            reason: format!(
                "ciphertext too short: expected at least {} bytes, got {}",
                POINT_SIZE + NONCE_SIZE + TAG_SIZE,
                ciphertext.len()
            ),
        });
    }
    let (r, rest) = ciphertext.split_at(POINT_SIZE);
    let (nonce, sealed) = rest.split_at(NONCE_SIZE);
    Ok((r, nonce, sealed))
}

fn parse_point(bytes: &[u8], key_type: &str) -> Result<ProjectivePoint, CryptoError> {
    PublicKey::from_sec1_bytes(bytes)
        .map(|pk| pk.to_projective())
        .map_err(|e| CryptoError::InvalidKey {
            key_type: key_type.to_string(),
            reason: e.to_string(),
        })
}

fn compress(point: &ProjectivePoint) -> Vec<u8> {
    point.to_affine().to_encoded_point(true).as_bytes().to_vec()
}

fn derive_key(r: &[u8], shared: &[u8]) -> Result<[u8; 32], CryptoError> {
    let mut ikm = Vec::with_capacity(r.len() + shared.len());
    ikm.extend_from_slice(r);
    ikm.extend_from_slice(shared);

    let hkdf = Hkdf::<Sha256>::new(None, &ikm);
    let mut key = [0u8; 32];
    hkdf.expand(KDF_INFO, &mut key)
        .map_err(|e| CryptoError::Other(format!("HKDF key derivation failed: {}", e)))?;
    Ok(key)
}
