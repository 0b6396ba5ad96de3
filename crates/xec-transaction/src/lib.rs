//! eCash SDK - Transaction model, sighash engine and builder.
//!
//! This crate provides:
//! - The `Tx`/`TxInput`/`TxOutput` wire model with exact-size serialization
//! - `SigHashType`, the typed algebra over the 8-bit sighash flags
//! - `UnsignedTx`, computing legacy and BIP143 sighash preimages
//! - `TxBuilder`, assembling and signing transactions with automatic
//!   fee and leftover (change) handling

pub mod builder;
pub mod input;
pub mod output;
pub mod sighash;
pub mod transaction;
pub mod unsigned;

mod error;
pub use builder::{
    p2pk_signatory, p2pkh_signatory, sign_with_sig_hash, Signatory, TxBuilder, TxBuilderInput,
    TxBuilderOutput,
};
pub use error::TransactionError;
pub use input::{OutPoint, SignData, TxInput};
pub use output::TxOutput;
pub use sighash::{SigHashType, SigHashTypeInputs, SigHashTypeOutputs, SigHashTypeVariant};
pub use transaction::{Tx, TxId};
pub use unsigned::{SighashPreimage, UnsignedTx, UnsignedTxInput};
