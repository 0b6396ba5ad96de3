//! Sighash preimage computation.
//!
//! An `UnsignedTx` snapshots a transaction together with the three aggregate
//! hashes (prevouts, sequences, outputs) BIP143 preimages reuse across
//! inputs. `UnsignedTxInput` then renders the preimage of a single input for
//! any sighash type, legacy or BIP143.

use xec_primitives::hash::sha256d;
use xec_primitives::ser::{BytesWriter, LengthWriter, Writer};
use xec_script::Script;

use crate::input::TxInput;
use crate::sighash::{SigHashType, SigHashTypeInputs, SigHashTypeOutputs, SigHashTypeVariant};
use crate::transaction::Tx;
use crate::TransactionError;

/// A transaction prepared for signing.
#[derive(Debug, Clone)]
pub struct UnsignedTx {
    tx: Tx,
    prevouts_hash: [u8; 32],
    sequences_hash: [u8; 32],
    outputs_hash: [u8; 32],
}

/// The rendered sighash preimage of one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SighashPreimage {
    /// The preimage bytes; the sighash is their double SHA-256.
    pub bytes: Vec<u8>,
    /// The script code actually signed, after OP_CODESEPARATOR cutting.
    pub script_code: Script,
    /// The resolved spent script, before any cutting.
    pub redeem_script: Script,
}

impl UnsignedTx {
    /// Prepare a transaction for signing, precomputing the aggregate hashes.
    pub fn from_tx(tx: Tx) -> Self {
        let mut prevouts = BytesWriter::new();
        let mut sequences = BytesWriter::new();
        for input in &tx.inputs {
            input.prev_out.write_to(&mut prevouts);
            sequences.put_u32_le(input.sequence);
        }
        let mut outputs = BytesWriter::new();
        for output in &tx.outputs {
            output.write_to(&mut outputs);
        }
        UnsignedTx {
            prevouts_hash: sha256d(prevouts.as_bytes()),
            sequences_hash: sha256d(sequences.as_bytes()),
            outputs_hash: sha256d(outputs.as_bytes()),
            tx,
        }
    }

    /// Prepare a transaction with zeroed aggregate hashes.
    ///
    /// Cheaper than `from_tx`; only suitable for size estimation, since any
    /// BIP143 signature over these hashes is invalid.
    pub fn dummy_from_tx(tx: Tx) -> Self {
        UnsignedTx {
            tx,
            prevouts_hash: [0u8; 32],
            sequences_hash: [0u8; 32],
            outputs_hash: [0u8; 32],
        }
    }

    pub fn tx(&self) -> &Tx {
        &self.tx
    }

    /// Take the transaction back out.
    pub fn into_tx(self) -> Tx {
        self.tx
    }

    pub fn prevouts_hash(&self) -> &[u8; 32] {
        &self.prevouts_hash
    }

    pub fn sequences_hash(&self) -> &[u8; 32] {
        &self.sequences_hash
    }

    pub fn outputs_hash(&self) -> &[u8; 32] {
        &self.outputs_hash
    }

    /// The signing view of the input at `input_idx`.
    pub fn input_at(&self, input_idx: usize) -> Result<UnsignedTxInput<'_>, TransactionError> {
        if input_idx >= self.tx.inputs.len() {
            return Err(TransactionError::InputIdxOutOfRange {
                index: input_idx,
                num_inputs: self.tx.inputs.len(),
            });
        }
        Ok(UnsignedTxInput { unsigned_tx: self, input_idx })
    }
}

/// One input of an `UnsignedTx`, ready to compute sighashes.
#[derive(Debug, Clone, Copy)]
pub struct UnsignedTxInput<'a> {
    unsigned_tx: &'a UnsignedTx,
    input_idx: usize,
}

impl<'a> UnsignedTxInput<'a> {
    pub fn unsigned_tx(&self) -> &'a UnsignedTx {
        self.unsigned_tx
    }

    pub fn input_idx(&self) -> usize {
        self.input_idx
    }

    pub fn tx_input(&self) -> &'a TxInput {
        &self.unsigned_tx.tx.inputs[self.input_idx]
    }

    /// Compute the sighash preimage of this input.
    ///
    /// # Arguments
    /// * `sig_hash_type` - Which sighash algorithm and commitments to use.
    /// * `codesep_idx` - If the spent script executed OP_CODESEPARATOR,
    ///   the zero-based index of the last executed separator.
    pub fn sig_hash_preimage(
        &self,
        sig_hash_type: SigHashType,
        codesep_idx: Option<usize>,
    ) -> Result<SighashPreimage, TransactionError> {
        let tx = &self.unsigned_tx.tx;
        let input = self.tx_input();
        let sign_data = input
            .sign_data
            .as_ref()
            .ok_or(TransactionError::MissingSignData)?;
        let redeem_script = if let Some(output_script) = &sign_data.output_script {
            if output_script.is_p2sh() {
                return Err(TransactionError::P2shRequiresRedeemScript);
            }
            output_script
        } else if let Some(redeem_script) = &sign_data.redeem_script {
            redeem_script
        } else {
            return Err(TransactionError::MissingScriptCode);
        };
        let script_code = match codesep_idx {
            Some(n_codesep) => redeem_script.cut_out_codesep(n_codesep)?,
            None => redeem_script.clone(),
        };

        let bytes = match sig_hash_type.variant {
            SigHashTypeVariant::Bip143 => {
                let mut length = LengthWriter::new();
                self.write_bip143_preimage(&mut length, &script_code, sign_data.value, sig_hash_type);
                let mut writer = BytesWriter::with_capacity(length.length());
                self.write_bip143_preimage(&mut writer, &script_code, sign_data.value, sig_hash_type);
                writer.into_bytes()
            }
            SigHashTypeVariant::Legacy => {
                if sig_hash_type.output_type == SigHashTypeOutputs::Single
                    && self.input_idx >= tx.outputs.len()
                {
                    return Err(TransactionError::SingleWithoutCorrespondingOutput);
                }
                // Legacy preimages never contain codeseparator opcodes.
                let stripped = script_code.strip_codeseps()?;
                let mut length = LengthWriter::new();
                self.write_legacy_preimage(&mut length, &stripped, sig_hash_type);
                let mut writer = BytesWriter::with_capacity(length.length());
                self.write_legacy_preimage(&mut writer, &stripped, sig_hash_type);
                writer.into_bytes()
            }
        };

        Ok(SighashPreimage {
            bytes,
            script_code,
            redeem_script: redeem_script.clone(),
        })
    }

    /// The sighash of this input: double SHA-256 of the preimage bytes.
    pub fn sig_hash(
        &self,
        sig_hash_type: SigHashType,
        codesep_idx: Option<usize>,
    ) -> Result<[u8; 32], TransactionError> {
        let preimage = self.sig_hash_preimage(sig_hash_type, codesep_idx)?;
        Ok(sha256d(&preimage.bytes))
    }

    fn write_bip143_preimage<W: Writer>(
        &self,
        writer: &mut W,
        script_code: &Script,
        value: u64,
        sig_hash_type: SigHashType,
    ) {
        let unsigned_tx = self.unsigned_tx;
        let tx = &unsigned_tx.tx;
        let input = self.tx_input();
        let anyone_can_pay = sig_hash_type.input_type == SigHashTypeInputs::AnyoneCanPay;

        writer.put_u32_le(tx.version as u32);
        writer.put_bytes(if anyone_can_pay {
            &[0u8; 32]
        } else {
            &unsigned_tx.prevouts_hash
        });
        let commits_sequences =
            !anyone_can_pay && sig_hash_type.output_type == SigHashTypeOutputs::All;
        writer.put_bytes(if commits_sequences {
            &unsigned_tx.sequences_hash
        } else {
            &[0u8; 32]
        });
        input.prev_out.write_to(writer);
        script_code.write_with_size(writer);
        writer.put_u64_le(value);
        writer.put_u32_le(input.sequence);
        match sig_hash_type.output_type {
            SigHashTypeOutputs::All => writer.put_bytes(&unsigned_tx.outputs_hash),
            SigHashTypeOutputs::None => writer.put_bytes(&[0u8; 32]),
            SigHashTypeOutputs::Single => {
                if let Some(output) = tx.outputs.get(self.input_idx) {
                    let mut single = BytesWriter::new();
                    output.write_to(&mut single);
                    writer.put_bytes(&sha256d(single.as_bytes()));
                } else {
                    // No corresponding output commits to 32 zero bytes here,
                    // unlike the legacy algorithm which refuses outright.
                    writer.put_bytes(&[0u8; 32]);
                }
            }
        }
        writer.put_u32_le(tx.locktime);
        writer.put_u32_le(sig_hash_type.to_int());
    }

    fn write_legacy_preimage<W: Writer>(
        &self,
        writer: &mut W,
        stripped_script_code: &Script,
        sig_hash_type: SigHashType,
    ) {
        let tx = &self.unsigned_tx.tx;
        let anyone_can_pay = sig_hash_type.input_type == SigHashTypeInputs::AnyoneCanPay;

        writer.put_u32_le(tx.version as u32);

        if anyone_can_pay {
            let input = self.tx_input();
            writer.put_varint(1);
            input.prev_out.write_to(writer);
            stripped_script_code.write_with_size(writer);
            writer.put_u32_le(input.sequence);
        } else {
            writer.put_varint(tx.inputs.len() as u64);
            for (idx, input) in tx.inputs.iter().enumerate() {
                input.prev_out.write_to(writer);
                if idx == self.input_idx {
                    stripped_script_code.write_with_size(writer);
                } else {
                    writer.put_varint(0);
                }
                let sequence = if idx != self.input_idx
                    && sig_hash_type.output_type != SigHashTypeOutputs::All
                {
                    0
                } else {
                    input.sequence
                };
                writer.put_u32_le(sequence);
            }
        }

        match sig_hash_type.output_type {
            SigHashTypeOutputs::All => {
                writer.put_varint(tx.outputs.len() as u64);
                for output in &tx.outputs {
                    output.write_to(writer);
                }
            }
            SigHashTypeOutputs::None => writer.put_varint(0),
            SigHashTypeOutputs::Single => {
                // Range-checked before serialization starts.
                writer.put_varint(self.input_idx as u64 + 1);
                for _ in 0..self.input_idx {
                    writer.put_u64_le(0);
                    writer.put_varint(0);
                }
                tx.outputs[self.input_idx].write_to(writer);
            }
        }

        writer.put_u32_le(tx.locktime);
        writer.put_u32_le(sig_hash_type.to_int());
    }
}
