//! eCash SDK - Script bytecode, opcode codec, and addresses.
//!
//! This crate provides:
//! - Opcode constants (`opcodes`)
//! - The `Op` codec for reading/writing single script operations
//! - `Script`, a byte-buffer newtype with an op cursor, OP_CODESEPARATOR
//!   handling and the standard P2PKH/P2SH/P2PK templates
//! - Legacy Base58Check `Address` parsing and rendering

pub mod address;
pub mod op;
pub mod opcodes;
pub mod script;

mod error;
pub use address::{Address, AddressType, Network};
pub use error::ScriptError;
pub use op::{push_bytes_op, push_num_op, read_op, write_op, Op};
pub use script::{Ops, Script};
