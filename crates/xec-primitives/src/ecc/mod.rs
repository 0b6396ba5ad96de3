//! Elliptic curve capability for the eCash SDK.
//!
//! All secp256k1 operations go through the `Ecc` trait so higher layers
//! (transaction signing, HD derivation, message signing) stay independent of
//! the curve backend. `Secp256k1Ecc` is the real implementation over `k256`;
//! `EccDummy` produces zero-filled signatures of the correct size and exists
//! purely for transaction size estimation.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{ProjectivePoint, PublicKey, Scalar};

/// Errors from elliptic curve operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EccError {
    /// A secret key operand is out of range (zero or >= curve order).
    #[error("invalid secret key")]
    InvalidSeckey,

    /// A public key operand is not a valid curve point.
    #[error("invalid public key")]
    InvalidPubkey,

    /// The operation produced the zero scalar or the point at infinity.
    ///
    /// Distinct from the invalid-operand errors: HD derivation retries at the
    /// next child index on this error instead of failing.
    #[error("operation result is not a valid key")]
    InvalidResult,

    /// A signature is malformed or recovery failed.
    #[error("invalid signature")]
    InvalidSignature,

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// secp256k1 operations required by the SDK.
///
/// Secret keys are 32-byte big-endian scalars, public keys 33-byte compressed
/// SEC1 points, hashes 32 bytes.
pub trait Ecc {
    /// Derive the compressed public key for a secret key.
    fn derive_pubkey(&self, seckey: &[u8; 32]) -> Result<[u8; 33], EccError>;

    /// Check whether the bytes are a valid secret key (non-zero, below the
    /// curve order).
    fn is_valid_seckey(&self, seckey: &[u8; 32]) -> bool;

    /// Add two secret keys modulo the curve order.
    ///
    /// Returns `EccError::InvalidResult` if the sum is zero.
    fn seckey_add(&self, a: &[u8; 32], b: &[u8; 32]) -> Result<[u8; 32], EccError>;

    /// Add `b * G` to the public key `a`.
    ///
    /// Returns `EccError::InvalidResult` if the sum is the point at infinity.
    fn pubkey_add(&self, a: &[u8; 33], b: &[u8; 32]) -> Result<[u8; 33], EccError>;

    /// Produce a 64-byte Schnorr signature over a 32-byte hash.
    fn schnorr_sign(&self, seckey: &[u8; 32], hash: &[u8; 32]) -> Result<[u8; 64], EccError>;

    /// Produce a DER-encoded low-S ECDSA signature over a 32-byte hash.
    fn ecdsa_sign(&self, seckey: &[u8; 32], hash: &[u8; 32]) -> Result<Vec<u8>, EccError>;

    /// Produce a compact ECDSA signature plus recovery ID over a 32-byte hash.
    fn sign_recoverable(
        &self,
        seckey: &[u8; 32],
        hash: &[u8; 32],
    ) -> Result<([u8; 64], u8), EccError>;

    /// Recover the compressed public key from a compact signature, recovery
    /// ID and the signed hash.
    fn recover_sig(
        &self,
        sig: &[u8; 64],
        recovery_id: u8,
        hash: &[u8; 32],
    ) -> Result<[u8; 33], EccError>;
}

// ---------------------------------------------------------------------------
// Secp256k1Ecc
// ---------------------------------------------------------------------------

/// Real secp256k1 implementation backed by the `k256` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1Ecc;

fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr((*bytes).into()))
}

fn compressed(point: &PublicKey) -> [u8; 33] {
    let encoded = point.to_encoded_point(true);
    let mut out = [0u8; 33];
    out.copy_from_slice(encoded.as_bytes());
    out
}

impl Ecc for Secp256k1Ecc {
    fn derive_pubkey(&self, seckey: &[u8; 32]) -> Result<[u8; 33], EccError> {
        let signing_key = SigningKey::from_bytes(k256::FieldBytes::from_slice(seckey))
            .map_err(|_| EccError::InvalidSeckey)?;
        let encoded = signing_key.verifying_key().to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(encoded.as_bytes());
        Ok(out)
    }

    fn is_valid_seckey(&self, seckey: &[u8; 32]) -> bool {
        match scalar_from_bytes(seckey) {
            Some(scalar) => !bool::from(scalar.is_zero()),
            None => false,
        }
    }

    fn seckey_add(&self, a: &[u8; 32], b: &[u8; 32]) -> Result<[u8; 32], EccError> {
        let a = scalar_from_bytes(a).ok_or(EccError::InvalidSeckey)?;
        let b = scalar_from_bytes(b).ok_or(EccError::InvalidSeckey)?;
        let sum = a + b;
        if bool::from(sum.is_zero()) {
            return Err(EccError::InvalidResult);
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&sum.to_repr());
        Ok(out)
    }

    fn pubkey_add(&self, a: &[u8; 33], b: &[u8; 32]) -> Result<[u8; 33], EccError> {
        let point = PublicKey::from_sec1_bytes(a).map_err(|_| EccError::InvalidPubkey)?;
        let tweak = scalar_from_bytes(b).ok_or(EccError::InvalidSeckey)?;
        let sum = point.to_projective() + ProjectivePoint::GENERATOR * tweak;
        if bool::from(sum.is_identity()) {
            return Err(EccError::InvalidResult);
        }
        let sum = PublicKey::from_affine(sum.to_affine()).map_err(|_| EccError::InvalidResult)?;
        Ok(compressed(&sum))
    }

    fn schnorr_sign(&self, seckey: &[u8; 32], hash: &[u8; 32]) -> Result<[u8; 64], EccError> {
        let signing_key = k256::schnorr::SigningKey::from_bytes(seckey)
            .map_err(|_| EccError::InvalidSeckey)?;
        let sig = signing_key
            .sign_raw(hash, &[0u8; 32])
            .map_err(|e| EccError::SigningFailed(e.to_string()))?;
        let mut out = [0u8; 64];
        out.copy_from_slice(&sig.to_bytes());
        Ok(out)
    }

    fn ecdsa_sign(&self, seckey: &[u8; 32], hash: &[u8; 32]) -> Result<Vec<u8>, EccError> {
        let signing_key = SigningKey::from_bytes(k256::FieldBytes::from_slice(seckey))
            .map_err(|_| EccError::InvalidSeckey)?;
        let sig: EcdsaSignature = signing_key
            .sign_prehash(hash)
            .map_err(|e| EccError::SigningFailed(e.to_string()))?;
        Ok(sig.to_der().as_bytes().to_vec())
    }

    fn sign_recoverable(
        &self,
        seckey: &[u8; 32],
        hash: &[u8; 32],
    ) -> Result<([u8; 64], u8), EccError> {
        let signing_key = SigningKey::from_bytes(k256::FieldBytes::from_slice(seckey))
            .map_err(|_| EccError::InvalidSeckey)?;
        let (sig, recovery_id) = signing_key
            .sign_prehash_recoverable(hash)
            .map_err(|e| EccError::SigningFailed(e.to_string()))?;
        let mut out = [0u8; 64];
        out.copy_from_slice(&sig.to_bytes());
        Ok((out, recovery_id.to_byte()))
    }

    fn recover_sig(
        &self,
        sig: &[u8; 64],
        recovery_id: u8,
        hash: &[u8; 32],
    ) -> Result<[u8; 33], EccError> {
        let recovery_id = RecoveryId::from_byte(recovery_id).ok_or(EccError::InvalidSignature)?;
        let sig = EcdsaSignature::from_slice(sig).map_err(|_| EccError::InvalidSignature)?;
        let verifying_key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
            .map_err(|_| EccError::InvalidSignature)?;
        let encoded = verifying_key.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(encoded.as_bytes());
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// EccDummy
// ---------------------------------------------------------------------------

/// Fake ECC producing zero-filled signatures of maximum plausible size.
///
/// Used for the fee-estimation pass of transaction building, where only the
/// byte length of the signatures matters. Never use its output on-chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct EccDummy;

impl Ecc for EccDummy {
    fn derive_pubkey(&self, _seckey: &[u8; 32]) -> Result<[u8; 33], EccError> {
        Ok([0u8; 33])
    }

    fn is_valid_seckey(&self, _seckey: &[u8; 32]) -> bool {
        true
    }

    fn seckey_add(&self, _a: &[u8; 32], _b: &[u8; 32]) -> Result<[u8; 32], EccError> {
        Ok([0u8; 32])
    }

    fn pubkey_add(&self, _a: &[u8; 33], _b: &[u8; 32]) -> Result<[u8; 33], EccError> {
        Ok([0u8; 33])
    }

    fn schnorr_sign(&self, _seckey: &[u8; 32], _hash: &[u8; 32]) -> Result<[u8; 64], EccError> {
        Ok([0u8; 64])
    }

    fn ecdsa_sign(&self, _seckey: &[u8; 32], _hash: &[u8; 32]) -> Result<Vec<u8>, EccError> {
        // Maximum DER encoding: 72 bytes.
        Ok(vec![0u8; 72])
    }

    fn sign_recoverable(
        &self,
        _seckey: &[u8; 32],
        _hash: &[u8; 32],
    ) -> Result<([u8; 64], u8), EccError> {
        Ok(([0u8; 64], 0))
    }

    fn recover_sig(
        &self,
        _sig: &[u8; 64],
        _recovery_id: u8,
        _hash: &[u8; 32],
    ) -> Result<[u8; 33], EccError> {
        Ok([0u8; 33])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    const SECKEY: [u8; 32] = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
        0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
        0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18,
        0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20,
    ];

    #[test]
    fn test_derive_pubkey_known_vector() {
        let ecc = Secp256k1Ecc;
        let pubkey = ecc.derive_pubkey(&SECKEY).unwrap();
        assert_eq!(
            hex::encode(pubkey),
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
        );
    }

    #[test]
    fn test_is_valid_seckey() {
        let ecc = Secp256k1Ecc;
        assert!(ecc.is_valid_seckey(&SECKEY));
        assert!(!ecc.is_valid_seckey(&[0u8; 32]));
        // The curve order itself is out of range.
        let order: [u8; 32] = [
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
            0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b,
            0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
        ];
        assert!(!ecc.is_valid_seckey(&order));
    }

    #[test]
    fn test_seckey_add_matches_pubkey_add() {
        let ecc = Secp256k1Ecc;
        let mut tweak = [0u8; 32];
        tweak[31] = 0x42;
        let sum_seckey = ecc.seckey_add(&SECKEY, &tweak).unwrap();
        let from_seckey = ecc.derive_pubkey(&sum_seckey).unwrap();
        let base_pubkey = ecc.derive_pubkey(&SECKEY).unwrap();
        let from_pubkey = ecc.pubkey_add(&base_pubkey, &tweak).unwrap();
        assert_eq!(from_seckey, from_pubkey);
    }

    #[test]
    fn test_seckey_add_negation_is_invalid_result() {
        let ecc = Secp256k1Ecc;
        // -SECKEY mod n, so the sum is zero.
        let neg = {
            let scalar = scalar_from_bytes(&SECKEY).unwrap();
            let mut out = [0u8; 32];
            out.copy_from_slice(&(-scalar).to_repr());
            out
        };
        assert_eq!(ecc.seckey_add(&SECKEY, &neg), Err(EccError::InvalidResult));
    }

    #[test]
    fn test_ecdsa_sign_recover_roundtrip() {
        let ecc = Secp256k1Ecc;
        let hash = sha256(b"recoverable message");
        let (sig, recovery_id) = ecc.sign_recoverable(&SECKEY, &hash).unwrap();
        let recovered = ecc.recover_sig(&sig, recovery_id, &hash).unwrap();
        assert_eq!(recovered, ecc.derive_pubkey(&SECKEY).unwrap());
    }

    #[test]
    fn test_ecdsa_sign_der_shape() {
        let ecc = Secp256k1Ecc;
        let hash = sha256(b"der message");
        let sig = ecc.ecdsa_sign(&SECKEY, &hash).unwrap();
        assert_eq!(sig[0], 0x30);
        assert!(sig.len() >= 8 && sig.len() <= 72);
    }

    #[test]
    fn test_schnorr_sign_is_64_bytes() {
        let ecc = Secp256k1Ecc;
        let hash = sha256(b"schnorr message");
        let sig = ecc.schnorr_sign(&SECKEY, &hash).unwrap();
        assert_eq!(sig.len(), 64);
        assert_ne!(sig, [0u8; 64]);
    }

    #[test]
    fn test_dummy_sizes() {
        let ecc = EccDummy;
        assert_eq!(ecc.schnorr_sign(&SECKEY, &[0u8; 32]).unwrap(), [0u8; 64]);
        assert_eq!(ecc.ecdsa_sign(&SECKEY, &[0u8; 32]).unwrap().len(), 72);
        let (sig, recovery_id) = ecc.sign_recoverable(&SECKEY, &[0u8; 32]).unwrap();
        assert_eq!(sig, [0u8; 64]);
        assert_eq!(recovery_id, 0);
    }
}
