use xec_primitives::ecc::EccError;
use xec_primitives::PrimitivesError;
use xec_script::ScriptError;

/// Error type for transaction serialization, sighash computation and
/// building.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("primitives: {0}")]
    Primitives(#[from] PrimitivesError),

    #[error("script: {0}")]
    Script(#[from] ScriptError),

    #[error("ecc: {0}")]
    Ecc(#[from] EccError),

    #[error("transaction ID must be 32 bytes, got {0}")]
    InvalidTxIdLength(usize),

    #[error("{0} bytes left over after deserializing transaction")]
    LeftoverBytes(usize),

    #[error("input index {index} out of range, transaction has {num_inputs} inputs")]
    InputIdxOutOfRange { index: usize, num_inputs: usize },

    #[error("input must have sign data set")]
    MissingSignData,

    #[error("must either set output_script or redeem_script")]
    MissingScriptCode,

    #[error("P2SH requires redeem_script to be set, not output_script")]
    P2shRequiresRedeemScript,

    #[error("invalid usage of SINGLE, input has no corresponding output")]
    SingleWithoutCorrespondingOutput,

    #[error("multiple leftover outputs, can at most use one")]
    MultipleLeftoverOutputs,

    #[error("using a leftover output requires setting fee_per_kb")]
    LeftoverRequiresFeePerKb,

    #[error("using a leftover output requires setting dust_limit")]
    LeftoverRequiresDustLimit,

    #[error("using a leftover output requires setting SignData.value for all inputs")]
    LeftoverRequiresSignDataValue,

    #[error(
        "insufficient input value ({input_sum}): can only pay for {available_fee} fees, \
         but {required_fee} required"
    )]
    InsufficientInputValue {
        input_sum: u64,
        available_fee: u64,
        required_fee: u64,
    },
}
