//! BIP32 hierarchical deterministic key derivation.

mod error;
pub mod hd_node;

pub use error::HdWalletError;
pub use hd_node::{HdNode, XPUB_VERSION_MAINNET, XPUB_VERSION_TESTNET};
