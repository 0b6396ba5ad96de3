use crate::ecc::EccError;

/// Unified error type for all primitives operations.
///
/// Covers errors from binary deserialization, encoding, mnemonics, and EC
/// operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PrimitivesError {
    #[error("not enough bytes: requested {requested}, but only {available} available")]
    NotEnoughBytes { requested: usize, available: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("base58check checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("word list must contain {expected} words, got {got}")]
    InvalidWordListLength { expected: usize, got: usize },

    #[error("invalid entropy length: {0} bytes, must be 16, 20, 24, 28 or 32")]
    InvalidEntropyLength(usize),

    #[error("invalid mnemonic word count: {0}")]
    InvalidWordCount(usize),

    #[error("unknown mnemonic word: {0:?}")]
    UnknownWord(String),

    #[error("mnemonic checksum mismatch: expected {expected}, got {actual}")]
    MnemonicChecksumMismatch { expected: String, actual: String },

    #[error("ecc: {0}")]
    Ecc(#[from] EccError),

    #[error("{0}")]
    Other(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
