//! Transaction inputs.

use xec_primitives::ser::{BytesReader, Writer};
use xec_script::Script;

use crate::transaction::TxId;
use crate::TransactionError;

/// Reference to an output of a previous transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutPoint {
    pub txid: TxId,
    pub out_idx: u32,
}

impl OutPoint {
    pub fn write_to(&self, writer: &mut impl Writer) {
        writer.put_bytes(self.txid.as_bytes());
        writer.put_u32_le(self.out_idx);
    }

    pub fn read_from(reader: &mut BytesReader) -> Result<Self, TransactionError> {
        let txid = TxId::new(reader.read_array::<32>()?);
        let out_idx = reader.read_u32_le()?;
        Ok(OutPoint { txid, out_idx })
    }
}

/// Data required to compute an input's sighash; never serialized.
///
/// Signatures commit to the value and script of the output being spent, but
/// the wire format of a transaction does not carry them, so signing needs
/// them supplied alongside the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignData {
    /// Value of the output being spent, in satoshis.
    pub value: u64,
    /// Script of the output being spent. Must not be a P2SH template.
    pub output_script: Option<Script>,
    /// Redeem script, required when spending a P2SH output.
    pub redeem_script: Option<Script>,
}

/// A single transaction input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxInput {
    pub prev_out: OutPoint,
    pub script: Script,
    pub sequence: u32,
    /// Sighash data for this input; not part of the wire format.
    pub sign_data: Option<SignData>,
}

impl TxInput {
    pub fn write_to(&self, writer: &mut impl Writer) {
        self.prev_out.write_to(writer);
        self.script.write_with_size(writer);
        writer.put_u32_le(self.sequence);
    }

    pub fn read_from(reader: &mut BytesReader) -> Result<Self, TransactionError> {
        let prev_out = OutPoint::read_from(reader)?;
        let script_len = reader.read_varint()?;
        let script = Script::new(reader.read_bytes(script_len as usize)?.to_vec());
        let sequence = reader.read_u32_le()?;
        Ok(TxInput { prev_out, script, sequence, sign_data: None })
    }
}

impl Default for OutPoint {
    fn default() -> Self {
        OutPoint { txid: TxId::new([0u8; 32]), out_idx: 0 }
    }
}
