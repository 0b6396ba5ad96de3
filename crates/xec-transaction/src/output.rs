//! Transaction outputs.

use xec_primitives::ser::{BytesReader, Writer};
use xec_script::Script;

use crate::TransactionError;

/// A single transaction output: a value and the script locking it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOutput {
    /// Value in satoshis.
    pub value: u64,
    pub script: Script,
}

impl TxOutput {
    pub fn write_to(&self, writer: &mut impl Writer) {
        writer.put_u64_le(self.value);
        self.script.write_with_size(writer);
    }

    pub fn read_from(reader: &mut BytesReader) -> Result<Self, TransactionError> {
        let value = reader.read_u64_le()?;
        let script_len = reader.read_varint()?;
        let script = Script::new(reader.read_bytes(script_len as usize)?.to_vec());
        Ok(TxOutput { value, script })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xec_primitives::ser::BytesWriter;

    #[test]
    fn test_output_wire_roundtrip() {
        let output = TxOutput {
            value: 0x8079685746352413,
            script: Script::from_hex("564738291092837465").unwrap(),
        };
        let mut writer = BytesWriter::new();
        output.write_to(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(hex::encode(&bytes), "132435465768798009564738291092837465");

        let mut reader = BytesReader::new(&bytes);
        assert_eq!(TxOutput::read_from(&mut reader).unwrap(), output);
    }
}
