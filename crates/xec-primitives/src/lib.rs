//! eCash SDK - Cryptographic primitives, hashing, and serialization utilities.
//!
//! This crate provides the foundational building blocks for the eCash SDK:
//! - Hash functions (SHA-256, SHA-256d, RIPEMD-160, SHA-512, HMAC)
//! - Binary writer/reader with Bitcoin-style VarInt encoding
//! - Base58 and Base58Check encoding/decoding
//! - The `Ecc` elliptic curve capability trait with a secp256k1 backend
//! - BIP39-style mnemonics and generic PBKDF2

pub mod base58;
pub mod bip39;
pub mod ecc;
pub mod hash;
pub mod ser;

mod error;
pub use error::PrimitivesError;
