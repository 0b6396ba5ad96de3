#![deny(missing_docs)]

//! eCash SDK - Complete SDK.
//!
//! Re-exports all eCash SDK components for convenient single-crate usage.

pub use xec_hdwallet as hdwallet;
pub use xec_message as message;
pub use xec_primitives as primitives;
pub use xec_script as script;
pub use xec_transaction as transaction;
