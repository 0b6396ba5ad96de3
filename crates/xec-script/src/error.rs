use xec_primitives::PrimitivesError;

/// Error type for script encoding, decoding and address handling.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("primitives: {0}")]
    Primitives(#[from] PrimitivesError),

    #[error("push opcode 0x{opcode:02x} expects {opcode} bytes, got {data_len}")]
    InconsistentPushOp { opcode: u8, data_len: usize },

    #[error("opcode 0x{0:02x} cannot carry push data")]
    NotAPushOpcode(u8),

    #[error("push data too big: {0} bytes")]
    DataTooBig(usize),

    #[error("no OP_CODESEPARATOR number {wanted}, script only has {found}")]
    CodesepNotFound { wanted: usize, found: usize },

    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid address payload length: {0}")]
    InvalidAddressPayload(usize),

    #[error("unsupported address version byte 0x{0:02x}")]
    UnsupportedAddressVersion(u8),
}
