//! Errors of the HD wallet crate.

use thiserror::Error;
use xec_primitives::ecc::EccError;
use xec_primitives::PrimitivesError;

/// Errors indicating failed HD key derivation or encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HdWalletError {
    /// Primitives failed
    #[error("Primitives error: {0}")]
    Primitives(#[from] PrimitivesError),

    /// Elliptic curve operation failed
    #[error("Ecc error: {0}")]
    Ecc(#[from] EccError),

    /// Seed must be 16 to 64 bytes
    #[error("Invalid seed length: expected 16 to 64 bytes but got {0}")]
    InvalidSeedLength(usize),

    /// Hardened derivation needs the private key
    #[error("Hardened derivation requires a private key")]
    MissingSeckey,

    /// Hardened index must leave room for the hardened offset
    #[error("Invalid hardened index: {0}")]
    InvalidHardenedIndex(u32),

    /// Derivation index retries ran past the index space
    #[error("Derivation index overflow")]
    DerivationIndexOverflow,

    /// Path starting with "m" requires a master node
    #[error("Expected master node")]
    ExpectedMaster,

    /// Path segment is not a number with optional ' suffix
    #[error("Invalid path segment: {0:?}")]
    InvalidPathSegment(String),

    /// xpub payload must be exactly 78 bytes
    #[error("Invalid xpub payload length: expected 78 bytes but got {0}")]
    InvalidXpubLength(usize),

    /// xpub version marker is not a known network
    #[error("Unknown xpub version: {0:#010x}")]
    UnknownXpubVersion(u32),

    /// Public key must be a compressed point
    #[error("Public key is not compressed, got prefix byte {0:#04x}")]
    NotCompressed(u8),
}
