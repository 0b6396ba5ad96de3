//! The typed algebra over the 8-bit sighash flags.
//!
//! A sighash type has three independent dimensions: the algorithm variant
//! (legacy or BIP143), whether other inputs are committed to, and which
//! outputs are committed to. `from_int`/`to_int` are exact inverses over the
//! valid flag bytes; everything else is rejected.

/// Which preimage algorithm the signature uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SigHashTypeVariant {
    /// Original Satoshi algorithm.
    Legacy = 0x00,
    /// BIP143 aggregate-hash algorithm, flagged by the fork bit.
    Bip143 = 0x40,
}

/// Which inputs the signature commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SigHashTypeInputs {
    /// All inputs of the transaction.
    Fixed = 0x00,
    /// Only the signed input (ANYONECANPAY).
    AnyoneCanPay = 0x80,
}

/// Which outputs the signature commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SigHashTypeOutputs {
    /// All outputs.
    All = 0x01,
    /// No outputs.
    None = 0x02,
    /// Only the output at the signed input's index.
    Single = 0x03,
}

/// A fully specified sighash type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigHashType {
    pub variant: SigHashTypeVariant,
    pub input_type: SigHashTypeInputs,
    pub output_type: SigHashTypeOutputs,
}

/// Bits that may be set in a valid sighash flag byte.
const VALID_BITS: u32 = 0x01 | 0x02 | 0x40 | 0x80;

impl SigHashType {
    pub const ALL_BIP143: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Bip143,
        input_type: SigHashTypeInputs::Fixed,
        output_type: SigHashTypeOutputs::All,
    };
    pub const ALL_LEGACY: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Legacy,
        input_type: SigHashTypeInputs::Fixed,
        output_type: SigHashTypeOutputs::All,
    };
    pub const ALL_ANYONECANPAY_BIP143: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Bip143,
        input_type: SigHashTypeInputs::AnyoneCanPay,
        output_type: SigHashTypeOutputs::All,
    };
    pub const ALL_ANYONECANPAY_LEGACY: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Legacy,
        input_type: SigHashTypeInputs::AnyoneCanPay,
        output_type: SigHashTypeOutputs::All,
    };
    pub const NONE_BIP143: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Bip143,
        input_type: SigHashTypeInputs::Fixed,
        output_type: SigHashTypeOutputs::None,
    };
    pub const NONE_LEGACY: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Legacy,
        input_type: SigHashTypeInputs::Fixed,
        output_type: SigHashTypeOutputs::None,
    };
    pub const NONE_ANYONECANPAY_BIP143: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Bip143,
        input_type: SigHashTypeInputs::AnyoneCanPay,
        output_type: SigHashTypeOutputs::None,
    };
    pub const NONE_ANYONECANPAY_LEGACY: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Legacy,
        input_type: SigHashTypeInputs::AnyoneCanPay,
        output_type: SigHashTypeOutputs::None,
    };
    pub const SINGLE_BIP143: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Bip143,
        input_type: SigHashTypeInputs::Fixed,
        output_type: SigHashTypeOutputs::Single,
    };
    pub const SINGLE_LEGACY: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Legacy,
        input_type: SigHashTypeInputs::Fixed,
        output_type: SigHashTypeOutputs::Single,
    };
    pub const SINGLE_ANYONECANPAY_BIP143: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Bip143,
        input_type: SigHashTypeInputs::AnyoneCanPay,
        output_type: SigHashTypeOutputs::Single,
    };
    pub const SINGLE_ANYONECANPAY_LEGACY: SigHashType = SigHashType {
        variant: SigHashTypeVariant::Legacy,
        input_type: SigHashTypeInputs::AnyoneCanPay,
        output_type: SigHashTypeOutputs::Single,
    };

    /// All BIP143 types, in flag order.
    pub const TYPES_BIP143: [SigHashType; 6] = [
        Self::ALL_BIP143,
        Self::NONE_BIP143,
        Self::SINGLE_BIP143,
        Self::ALL_ANYONECANPAY_BIP143,
        Self::NONE_ANYONECANPAY_BIP143,
        Self::SINGLE_ANYONECANPAY_BIP143,
    ];

    /// All legacy types, in flag order.
    pub const TYPES_LEGACY: [SigHashType; 6] = [
        Self::ALL_LEGACY,
        Self::NONE_LEGACY,
        Self::SINGLE_LEGACY,
        Self::ALL_ANYONECANPAY_LEGACY,
        Self::NONE_ANYONECANPAY_LEGACY,
        Self::SINGLE_ANYONECANPAY_LEGACY,
    ];

    /// The flag byte of this sighash type, as appended to signatures.
    pub const fn to_int(self) -> u32 {
        self.variant as u32 | self.input_type as u32 | self.output_type as u32
    }

    /// Parse a flag value.
    ///
    /// Returns `None` for values outside `0..=0xff`, values with reserved
    /// bits set, and the output bit pattern `00`.
    pub fn from_int(flags: u32) -> Option<SigHashType> {
        if flags > 0xff || flags & !VALID_BITS != 0 {
            return None;
        }
        let output_type = match flags & 0x03 {
            0x01 => SigHashTypeOutputs::All,
            0x02 => SigHashTypeOutputs::None,
            0x03 => SigHashTypeOutputs::Single,
            _ => return None,
        };
        let variant = if flags & 0x40 != 0 {
            SigHashTypeVariant::Bip143
        } else {
            SigHashTypeVariant::Legacy
        };
        let input_type = if flags & 0x80 != 0 {
            SigHashTypeInputs::AnyoneCanPay
        } else {
            SigHashTypeInputs::Fixed
        };
        Some(SigHashType { variant, input_type, output_type })
    }
}
