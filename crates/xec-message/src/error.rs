//! Errors of the message crate.

use thiserror::Error;
use xec_primitives::ecc::EccError;

/// Errors indicating failed message signing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    /// Elliptic curve operation failed
    #[error("Ecc error: {0}")]
    Ecc(#[from] EccError),
}
