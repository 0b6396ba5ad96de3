//! Transaction building and signing.
//!
//! A `TxBuilder` pairs each input with an optional `Signatory` closure that
//! produces the input's script once the final transaction shape is known.
//! Signing runs in two passes when a leftover output is present: a dummy pass
//! with placeholder signatures measures the exact serialized size, the fee is
//! derived from that size, and the real pass then signs the finished
//! transaction.

use xec_primitives::ecc::{Ecc, EccDummy};
use xec_primitives::hash::sha256d;
use xec_script::Script;

use crate::input::TxInput;
use crate::output::TxOutput;
use crate::sighash::{SigHashType, SigHashTypeVariant};
use crate::transaction::Tx;
use crate::unsigned::{UnsignedTx, UnsignedTxInput};
use crate::TransactionError;

/// Closure building the script of an input, given the elliptic curve
/// implementation and the signing view of the input.
pub type Signatory =
    Box<dyn Fn(&dyn Ecc, &UnsignedTxInput<'_>) -> Result<Script, TransactionError>>;

/// An input under construction.
pub struct TxBuilderInput {
    pub input: TxInput,
    /// Builds the input script at signing time. Inputs without a signatory
    /// keep whatever script is already set on `input`.
    pub signatory: Option<Signatory>,
}

/// An output under construction.
pub enum TxBuilderOutput {
    /// An output with a fixed value and script.
    Fixed(TxOutput),
    /// An output receiving whatever remains after fixed outputs and the fee.
    /// At most one per transaction.
    Leftover(Script),
}

/// Builds and signs a transaction.
#[derive(Default)]
pub struct TxBuilder {
    pub version: i32,
    pub inputs: Vec<TxBuilderInput>,
    pub outputs: Vec<TxBuilderOutput>,
    pub locktime: u32,
}

impl TxBuilder {
    pub fn new() -> Self {
        TxBuilder { version: 1, inputs: vec![], outputs: vec![], locktime: 0 }
    }

    /// Sign the transaction.
    ///
    /// `fee_per_kb` and `dust_limit` are required iff a leftover output is
    /// present. If the leftover would fall below `dust_limit` it is dropped
    /// and its value goes to the fee instead.
    pub fn sign(
        &self,
        ecc: &dyn Ecc,
        fee_per_kb: Option<u64>,
        dust_limit: Option<u64>,
    ) -> Result<Tx, TransactionError> {
        let num_leftover = self
            .outputs
            .iter()
            .filter(|output| matches!(output, TxBuilderOutput::Leftover(_)))
            .count();
        if num_leftover > 1 {
            return Err(TransactionError::MultipleLeftoverOutputs);
        }
        if num_leftover == 0 {
            return self.sign_tx(ecc, self.make_tx(None), false);
        }

        let fee_per_kb = fee_per_kb.ok_or(TransactionError::LeftoverRequiresFeePerKb)?;
        let dust_limit = dust_limit.ok_or(TransactionError::LeftoverRequiresDustLimit)?;
        let mut input_sum: u64 = 0;
        for builder_input in &self.inputs {
            let sign_data = builder_input
                .input
                .sign_data
                .as_ref()
                .ok_or(TransactionError::LeftoverRequiresSignDataValue)?;
            input_sum += sign_data.value;
        }
        let fixed_output_sum: u64 = self
            .outputs
            .iter()
            .map(|output| match output {
                TxBuilderOutput::Fixed(output) => output.value,
                TxBuilderOutput::Leftover(_) => 0,
            })
            .sum();

        // Dummy pass with the leftover output in place.
        let measured = self.sign_tx(&EccDummy, self.make_tx(Some(0)), true)?;
        let fee = calc_fee(measured.ser_size() as u64, fee_per_kb);
        if let Some(leftover) = input_sum
            .checked_sub(fixed_output_sum)
            .and_then(|available| available.checked_sub(fee))
        {
            if leftover >= dust_limit {
                return self.sign_tx(ecc, self.make_tx(Some(leftover)), false);
            }
        }

        // Leftover below dust (or inputs short of the fee): drop the leftover
        // output and measure again, its absence shrinks the transaction.
        let measured = self.sign_tx(&EccDummy, self.make_tx(None), true)?;
        let required_fee = calc_fee(measured.ser_size() as u64, fee_per_kb);
        let available_fee = input_sum.saturating_sub(fixed_output_sum);
        if available_fee < required_fee {
            return Err(TransactionError::InsufficientInputValue {
                input_sum,
                available_fee,
                required_fee,
            });
        }
        self.sign_tx(ecc, self.make_tx(None), false)
    }

    /// Assemble the transaction shape. `leftover_value` of `None` omits the
    /// leftover output entirely.
    fn make_tx(&self, leftover_value: Option<u64>) -> Tx {
        let mut outputs = Vec::with_capacity(self.outputs.len());
        for output in &self.outputs {
            match output {
                TxBuilderOutput::Fixed(output) => outputs.push(output.clone()),
                TxBuilderOutput::Leftover(script) => {
                    if let Some(value) = leftover_value {
                        outputs.push(TxOutput { value, script: script.clone() });
                    }
                }
            }
        }
        Tx {
            version: self.version,
            inputs: self.inputs.iter().map(|input| input.input.clone()).collect(),
            outputs,
            locktime: self.locktime,
        }
    }

    fn sign_tx(&self, ecc: &dyn Ecc, tx: Tx, dummy: bool) -> Result<Tx, TransactionError> {
        let unsigned_tx = if dummy {
            UnsignedTx::dummy_from_tx(tx)
        } else {
            UnsignedTx::from_tx(tx)
        };
        let mut scripts = Vec::with_capacity(self.inputs.len());
        for (input_idx, builder_input) in self.inputs.iter().enumerate() {
            if let Some(signatory) = &builder_input.signatory {
                let input = unsigned_tx.input_at(input_idx)?;
                scripts.push((input_idx, signatory(ecc, &input)?));
            }
        }
        let mut tx = unsigned_tx.into_tx();
        for (input_idx, script) in scripts {
            tx.inputs[input_idx].script = script;
        }
        Ok(tx)
    }
}

/// Fee for a transaction of `tx_size` bytes, rounded up.
fn calc_fee(tx_size: u64, fee_per_kb: u64) -> u64 {
    (tx_size * fee_per_kb).div_ceil(1000)
}

/// Sign a sighash and append the sighash flag byte.
///
/// BIP143 sighashes get a Schnorr signature, legacy sighashes an ECDSA
/// signature in DER encoding.
pub fn sign_with_sig_hash(
    ecc: &dyn Ecc,
    seckey: &[u8; 32],
    sig_hash_type: SigHashType,
    sig_hash: &[u8; 32],
) -> Result<Vec<u8>, TransactionError> {
    let mut sig = match sig_hash_type.variant {
        SigHashTypeVariant::Bip143 => ecc.schnorr_sign(seckey, sig_hash)?.to_vec(),
        SigHashTypeVariant::Legacy => ecc.ecdsa_sign(seckey, sig_hash)?,
    };
    sig.push(sig_hash_type.to_int() as u8);
    Ok(sig)
}

/// Signatory spending a P2PKH output: pushes the signature and the pubkey.
pub fn p2pkh_signatory(
    seckey: [u8; 32],
    pubkey: [u8; 33],
    sig_hash_type: SigHashType,
) -> Signatory {
    Box::new(move |ecc, input| {
        let preimage = input.sig_hash_preimage(sig_hash_type, None)?;
        let sig_hash = sha256d(&preimage.bytes);
        let sig = sign_with_sig_hash(ecc, &seckey, sig_hash_type, &sig_hash)?;
        Ok(Script::p2pkh_spend(&pubkey, &sig)?)
    })
}

/// Signatory spending a P2PK output: pushes only the signature.
pub fn p2pk_signatory(seckey: [u8; 32], sig_hash_type: SigHashType) -> Signatory {
    Box::new(move |ecc, input| {
        let preimage = input.sig_hash_preimage(sig_hash_type, None)?;
        let sig_hash = sha256d(&preimage.bytes);
        let sig = sign_with_sig_hash(ecc, &seckey, sig_hash_type, &sig_hash)?;
        Ok(Script::from_ops([xec_script::push_bytes_op(sig)?])?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{OutPoint, SignData};
    use crate::sighash::SigHashTypeOutputs;
    use crate::transaction::TxId;
    use xec_primitives::ecc::Secp256k1Ecc;

    const SECKEY: [u8; 32] = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c,
        0x1d, 0x1e, 0x1f, 0x20,
    ];

    fn p2pkh_script() -> Script {
        Script::p2pkh(&[0x12; 20]).unwrap()
    }

    fn builder_input(value: u64, signatory: Option<Signatory>) -> TxBuilderInput {
        TxBuilderInput {
            input: TxInput {
                prev_out: OutPoint { txid: TxId::new([0xfe; 32]), out_idx: 0 },
                script: Script::default(),
                sequence: 0xffffffff,
                sign_data: Some(SignData {
                    value,
                    output_script: Some(p2pkh_script()),
                    redeem_script: None,
                }),
            },
            signatory,
        }
    }

    fn dummy_p2pkh_signatory() -> Signatory {
        p2pkh_signatory(SECKEY, [0x03; 33], SigHashType::ALL_BIP143)
    }

    #[test]
    fn test_sign_without_leftover_keeps_preset_scripts() {
        let builder = TxBuilder {
            version: 1,
            inputs: vec![TxBuilderInput {
                input: TxInput {
                    prev_out: OutPoint::default(),
                    script: Script::from_hex("0151").unwrap(),
                    sequence: 0,
                    sign_data: None,
                },
                signatory: None,
            }],
            outputs: vec![TxBuilderOutput::Fixed(TxOutput {
                value: 546,
                script: p2pkh_script(),
            })],
            locktime: 0,
        };
        let tx = builder.sign(&EccDummy, None, None).unwrap();
        assert_eq!(tx.inputs[0].script.to_hex(), "0151");
        assert_eq!(tx.outputs.len(), 1);
    }

    #[test]
    fn test_sign_leftover_exact_value() {
        // With fee_per_kb = 1000 the fee equals the serialized size.
        let builder = TxBuilder {
            version: 1,
            inputs: vec![builder_input(40000, Some(dummy_p2pkh_signatory()))],
            outputs: vec![
                TxBuilderOutput::Fixed(TxOutput { value: 10000, script: p2pkh_script() }),
                TxBuilderOutput::Leftover(p2pkh_script()),
            ],
            locktime: 0,
        };
        let tx = builder.sign(&EccDummy, Some(1000), Some(546)).unwrap();
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[1].value, 40000 - 10000 - tx.ser_size() as u64);
        // P2PKH spend with a 65-byte Schnorr sig: two pushes, 100 bytes.
        assert_eq!(tx.inputs[0].script.len(), 100);
    }

    #[test]
    fn test_sign_leftover_zero_fee() {
        let builder = TxBuilder {
            version: 1,
            inputs: vec![builder_input(40000, Some(dummy_p2pkh_signatory()))],
            outputs: vec![TxBuilderOutput::Leftover(p2pkh_script())],
            locktime: 0,
        };
        let tx = builder.sign(&EccDummy, Some(0), Some(546)).unwrap();
        assert_eq!(tx.outputs[0].value, 40000);
    }

    #[test]
    fn test_sign_drops_leftover_below_dust() {
        let builder = TxBuilder {
            version: 1,
            inputs: vec![builder_input(40000, Some(dummy_p2pkh_signatory()))],
            outputs: vec![
                TxBuilderOutput::Fixed(TxOutput { value: 39500, script: p2pkh_script() }),
                TxBuilderOutput::Leftover(p2pkh_script()),
            ],
            locktime: 0,
        };
        // Leftover would be 500 - size, below a dust limit of 546.
        let tx = builder.sign(&EccDummy, Some(1000), Some(546)).unwrap();
        assert_eq!(tx.outputs.len(), 1);
        assert_eq!(tx.outputs[0].value, 39500);
    }

    #[test]
    fn test_sign_insufficient_input_value() {
        let builder = TxBuilder {
            version: 1,
            inputs: vec![builder_input(40000, Some(dummy_p2pkh_signatory()))],
            outputs: vec![
                TxBuilderOutput::Fixed(TxOutput { value: 39990, script: p2pkh_script() }),
                TxBuilderOutput::Leftover(p2pkh_script()),
            ],
            locktime: 0,
        };
        let err = builder.sign(&EccDummy, Some(1000), Some(546)).unwrap_err();
        match err {
            TransactionError::InsufficientInputValue {
                input_sum,
                available_fee,
                required_fee,
            } => {
                assert_eq!(input_sum, 40000);
                assert_eq!(available_fee, 10);
                assert!(required_fee > available_fee);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sign_multiple_leftover_outputs() {
        let builder = TxBuilder {
            version: 1,
            inputs: vec![builder_input(40000, Some(dummy_p2pkh_signatory()))],
            outputs: vec![
                TxBuilderOutput::Leftover(p2pkh_script()),
                TxBuilderOutput::Leftover(p2pkh_script()),
            ],
            locktime: 0,
        };
        assert!(matches!(
            builder.sign(&EccDummy, Some(1000), Some(546)),
            Err(TransactionError::MultipleLeftoverOutputs)
        ));
    }

    #[test]
    fn test_sign_leftover_missing_params() {
        let make_builder = || TxBuilder {
            version: 1,
            inputs: vec![builder_input(40000, None)],
            outputs: vec![TxBuilderOutput::Leftover(p2pkh_script())],
            locktime: 0,
        };
        assert!(matches!(
            make_builder().sign(&EccDummy, None, Some(546)),
            Err(TransactionError::LeftoverRequiresFeePerKb)
        ));
        assert!(matches!(
            make_builder().sign(&EccDummy, Some(1000), None),
            Err(TransactionError::LeftoverRequiresDustLimit)
        ));

        let mut builder = make_builder();
        builder.inputs[0].input.sign_data = None;
        assert!(matches!(
            builder.sign(&EccDummy, Some(1000), Some(546)),
            Err(TransactionError::LeftoverRequiresSignDataValue)
        ));
    }

    #[test]
    fn test_signatory_sees_final_outputs() {
        // A signatory may inspect the transaction it signs, including the
        // leftover output assembled before signing.
        let signatory: Signatory = Box::new(|_ecc, input| {
            assert_eq!(input.unsigned_tx().tx().outputs.len(), 2);
            Ok(Script::from_hex("0151").unwrap())
        });
        let builder = TxBuilder {
            version: 1,
            inputs: vec![builder_input(40000, Some(signatory))],
            outputs: vec![
                TxBuilderOutput::Fixed(TxOutput { value: 10000, script: p2pkh_script() }),
                TxBuilderOutput::Leftover(p2pkh_script()),
            ],
            locktime: 0,
        };
        let tx = builder.sign(&EccDummy, Some(1000), Some(546)).unwrap();
        assert_eq!(tx.inputs[0].script.to_hex(), "0151");
    }

    #[test]
    fn test_sign_with_sig_hash_appends_flag() {
        let sig_hash = [0x42u8; 32];
        let schnorr =
            sign_with_sig_hash(&EccDummy, &SECKEY, SigHashType::ALL_BIP143, &sig_hash).unwrap();
        assert_eq!(schnorr.len(), 65);
        assert_eq!(schnorr[64], 0x41);

        let ecdsa =
            sign_with_sig_hash(&EccDummy, &SECKEY, SigHashType::ALL_LEGACY, &sig_hash).unwrap();
        assert_eq!(*ecdsa.last().unwrap(), 0x01);
    }

    #[test]
    fn test_p2pk_signatory_script_is_single_push() {
        let builder = TxBuilder {
            version: 1,
            inputs: vec![TxBuilderInput {
                input: TxInput {
                    prev_out: OutPoint::default(),
                    script: Script::default(),
                    sequence: 0xffffffff,
                    sign_data: Some(SignData {
                        value: 1000,
                        output_script: Some(Script::p2pk(&[0x03; 33]).unwrap()),
                        redeem_script: None,
                    }),
                },
                signatory: Some(p2pk_signatory(SECKEY, SigHashType::ALL_BIP143)),
            }],
            outputs: vec![TxBuilderOutput::Fixed(TxOutput {
                value: 900,
                script: p2pkh_script(),
            })],
            locktime: 0,
        };
        let tx = builder.sign(&EccDummy, None, None).unwrap();
        // One push of a 65-byte signature.
        assert_eq!(tx.inputs[0].script.len(), 66);
    }

    #[test]
    fn test_sign_real_ecc_legacy_and_bip143() {
        let ecc = Secp256k1Ecc;
        let pubkey = ecc.derive_pubkey(&SECKEY).unwrap();
        for sig_hash_type in [SigHashType::ALL_BIP143, SigHashType::ALL_LEGACY] {
            let builder = TxBuilder {
                version: 1,
                inputs: vec![builder_input(
                    40000,
                    Some(p2pkh_signatory(SECKEY, pubkey, sig_hash_type)),
                )],
                outputs: vec![TxBuilderOutput::Leftover(p2pkh_script())],
                locktime: 0,
            };
            let tx = builder.sign(&ecc, Some(1000), Some(546)).unwrap();
            let script = tx.inputs[0].script.as_bytes();
            // Last pushed item is the 33-byte pubkey; the first push is the
            // signature ending in the sighash flag byte.
            assert_eq!(&script[script.len() - 33..], &pubkey[..]);
            let sig_len = script[0] as usize;
            assert_eq!(script[sig_len], sig_hash_type.to_int() as u8);
            assert_eq!(
                tx.outputs[0].value,
                40000u64 - calc_fee(tx.ser_size() as u64, 1000)
            );
        }
    }

    #[test]
    fn test_sighash_outputs_variants_still_sign() {
        for output_type in
            [SigHashTypeOutputs::All, SigHashTypeOutputs::None, SigHashTypeOutputs::Single]
        {
            let sig_hash_type = SigHashType {
                variant: SigHashTypeVariant::Bip143,
                input_type: crate::sighash::SigHashTypeInputs::Fixed,
                output_type,
            };
            let builder = TxBuilder {
                version: 1,
                inputs: vec![builder_input(
                    40000,
                    Some(p2pkh_signatory(SECKEY, [0x03; 33], sig_hash_type)),
                )],
                outputs: vec![TxBuilderOutput::Fixed(TxOutput {
                    value: 39000,
                    script: p2pkh_script(),
                })],
                locktime: 0,
            };
            let tx = builder.sign(&EccDummy, None, None).unwrap();
            assert_eq!(tx.inputs[0].script.len(), 100);
        }
    }
}
