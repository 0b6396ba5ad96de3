//! The transaction wire model.

use std::fmt;

use xec_primitives::hash::sha256d;
use xec_primitives::ser::{BytesReader, BytesWriter, LengthWriter, Writer};

use crate::input::TxInput;
use crate::output::TxOutput;
use crate::TransactionError;

/// A transaction ID: the double-SHA-256 of the serialized transaction.
///
/// Stored in wire byte order; the human-readable hex form is byte-reversed,
/// as is convention for Bitcoin-derived chains.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxId([u8; 32]);

impl TxId {
    /// Create a TxId from wire-order bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        TxId(bytes)
    }

    /// Parse a TxId from its display hex (byte-reversed) form.
    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(s).map_err(xec_primitives::PrimitivesError::from)?;
        if bytes.len() != 32 {
            return Err(TransactionError::InvalidTxIdLength(bytes.len()));
        }
        let mut out = [0u8; 32];
        for (i, byte) in bytes.iter().rev().enumerate() {
            out[i] = *byte;
        }
        Ok(TxId(out))
    }

    /// Display hex (byte-reversed) form.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Wire-order bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.to_hex())
    }
}

impl From<[u8; 32]> for TxId {
    fn from(bytes: [u8; 32]) -> Self {
        TxId(bytes)
    }
}

/// A transaction.
///
/// Wire order: version, inputs (VarInt count), outputs (VarInt count),
/// locktime. All integers little-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub locktime: u32,
}

impl Default for Tx {
    fn default() -> Self {
        Tx { version: 1, inputs: vec![], outputs: vec![], locktime: 0 }
    }
}

impl Tx {
    pub fn write_to(&self, writer: &mut impl Writer) {
        writer.put_u32_le(self.version as u32);
        writer.put_varint(self.inputs.len() as u64);
        for input in &self.inputs {
            input.write_to(writer);
        }
        writer.put_varint(self.outputs.len() as u64);
        for output in &self.outputs {
            output.write_to(writer);
        }
        writer.put_u32_le(self.locktime);
    }

    /// Serialize to wire bytes.
    pub fn ser(&self) -> Vec<u8> {
        let mut writer = BytesWriter::with_capacity(self.ser_size());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Exact serialized size in bytes, without allocating.
    pub fn ser_size(&self) -> usize {
        let mut writer = LengthWriter::new();
        self.write_to(&mut writer);
        writer.length()
    }

    /// Deserialize a transaction, requiring the input to be fully consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = BytesReader::new(bytes);
        let tx = Tx::read_from(&mut reader)?;
        if reader.remaining() > 0 {
            return Err(TransactionError::LeftoverBytes(reader.remaining()));
        }
        Ok(tx)
    }

    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        Tx::from_bytes(&hex::decode(s).map_err(xec_primitives::PrimitivesError::from)?)
    }

    pub fn read_from(reader: &mut BytesReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le()? as i32;
        let num_inputs = reader.read_varint()?;
        let mut inputs = Vec::with_capacity(num_inputs.min(0x10000) as usize);
        for _ in 0..num_inputs {
            inputs.push(TxInput::read_from(reader)?);
        }
        let num_outputs = reader.read_varint()?;
        let mut outputs = Vec::with_capacity(num_outputs.min(0x10000) as usize);
        for _ in 0..num_outputs {
            outputs.push(TxOutput::read_from(reader)?);
        }
        let locktime = reader.read_u32_le()?;
        Ok(Tx { version, inputs, outputs, locktime })
    }

    /// The transaction ID.
    pub fn txid(&self) -> TxId {
        TxId::new(sha256d(&self.ser()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::OutPoint;
    use xec_script::Script;

    fn test_tx() -> Tx {
        Tx {
            version: 0xfacefeedu32 as i32,
            inputs: vec![
                TxInput {
                    prev_out: OutPoint {
                        txid: TxId::from_hex(
                            "0123456789abcdef99887766554433220000000000000000f1e2d3c4b5a69788",
                        )
                        .unwrap(),
                        out_idx: 0xdeadbeef,
                    },
                    script: Script::default(),
                    sequence: 0x87654321,
                    sign_data: None,
                },
                TxInput {
                    prev_out: OutPoint {
                        txid: TxId::new(std::array::from_fn(|i| i as u8)),
                        out_idx: 0x76757473,
                    },
                    script: Script::default(),
                    sequence: 0x10605,
                    sign_data: None,
                },
            ],
            outputs: vec![
                TxOutput { value: 0x2134, script: Script::from_hex("1133557799").unwrap() },
                TxOutput {
                    value: 0x8079685746352413,
                    script: Script::from_hex("564738291092837465").unwrap(),
                },
                TxOutput { value: 0, script: Script::from_hex("6a68656c6c6f").unwrap() },
            ],
            locktime: 0xf00dbabe,
        }
    }

    const TEST_TX_HEX: &str = concat!(
        "edfecefa",
        "02",
        "8897a6b5c4d3e2f100000000000000002233445566778899efcdab8967452301",
        "efbeadde",
        "00",
        "21436587",
        "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
        "73747576",
        "00",
        "05060100",
        "03",
        "3421000000000000",
        "051133557799",
        "1324354657687980",
        "09564738291092837465",
        "0000000000000000",
        "066a68656c6c6f",
        "beba0df0",
    );

    #[test]
    fn test_txid_hex_reversal() {
        let display = "0123456789abcdef99887766554433220000000000000000f1e2d3c4b5a69788";
        let txid = TxId::from_hex(display).unwrap();
        assert_eq!(
            hex::encode(txid.as_bytes()),
            "8897a6b5c4d3e2f100000000000000002233445566778899efcdab8967452301"
        );
        assert_eq!(txid.to_hex(), display);
    }

    #[test]
    fn test_txid_invalid_length() {
        assert!(matches!(
            TxId::from_hex("abcd"),
            Err(TransactionError::InvalidTxIdLength(2))
        ));
    }

    #[test]
    fn test_tx_ser_golden() {
        let tx = test_tx();
        assert_eq!(hex::encode(tx.ser()), TEST_TX_HEX);
        assert_eq!(tx.ser_size(), TEST_TX_HEX.len() / 2);
    }

    #[test]
    fn test_tx_deser_roundtrip() {
        let tx = Tx::from_hex(TEST_TX_HEX).unwrap();
        assert_eq!(tx, test_tx());
    }

    #[test]
    fn test_tx_deser_trailing_bytes() {
        let mut bytes = test_tx().ser();
        bytes.push(0x00);
        assert!(matches!(
            Tx::from_bytes(&bytes),
            Err(TransactionError::LeftoverBytes(1))
        ));
    }

    #[test]
    fn test_empty_tx() {
        let tx = Tx::default();
        assert_eq!(hex::encode(tx.ser()), "01000000000000000000");
        assert_eq!(tx.ser_size(), 10);
    }

    #[test]
    fn test_txid_of_empty_tx_is_sha256d_of_ser() {
        let tx = Tx::default();
        let txid = tx.txid();
        assert_eq!(
            txid.as_bytes(),
            &xec_primitives::hash::sha256d(&tx.ser())
        );
    }
}
