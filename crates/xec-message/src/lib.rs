//! Signed messages: prove control of an address by signing arbitrary text.

mod error;
pub mod signed;

pub use error::MessageError;
pub use signed::{magic_hash, sign_msg, verify_msg, ECASH_MSG_PREFIX};
