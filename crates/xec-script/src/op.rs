//! Codec for single script operations.
//!
//! Every script is a flat sequence of operations: either a lone opcode or a
//! push opcode followed by its payload. `read_op`/`write_op` are exact
//! inverses over well-formed input; the push helpers produce the minimal
//! encoding for a payload or number.

use xec_primitives::ser::{BytesReader, LengthWriter, Writer};

use crate::opcodes::*;
use crate::ScriptError;

/// A single script operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// A lone opcode with no attached data.
    Code(u8),
    /// A push operation: the push opcode and the payload it carries.
    Push(u8, Vec<u8>),
}

impl Op {
    /// Serialized size of this op in bytes.
    pub fn ser_size(&self) -> usize {
        let mut writer = LengthWriter::new();
        // write_op rejects unencodable ops before emitting anything, so
        // those measure as 0.
        let _ = write_op(self, &mut writer);
        writer.length()
    }
}

/// Read one operation from the reader.
///
/// Opcodes 0x01..=0x4b push that many payload bytes; OP_PUSHDATA1/2/4 carry
/// an explicit little-endian length. Everything else is a plain `Op::Code`,
/// including opcodes that would fail script execution.
///
/// # Arguments
/// * `reader` - Cursor positioned at the start of an operation.
///
/// # Returns
/// The decoded `Op`, or `NotEnoughBytes` if the payload is truncated.
pub fn read_op(reader: &mut BytesReader) -> Result<Op, ScriptError> {
    let opcode = reader.read_u8()?;
    let data_len = match opcode {
        len @ 0x01..=0x4b => len as usize,
        OP_PUSHDATA1 => reader.read_u8()? as usize,
        OP_PUSHDATA2 => reader.read_u16_le()? as usize,
        OP_PUSHDATA4 => reader.read_u32_le()? as usize,
        _ => return Ok(Op::Code(opcode)),
    };
    Ok(Op::Push(opcode, reader.read_bytes(data_len)?.to_vec()))
}

/// Write one operation to the writer.
///
/// # Arguments
/// * `op` - The operation to encode.
/// * `writer` - Serialization sink.
///
/// # Returns
/// `InconsistentPushOp` if a single-byte push opcode disagrees with the
/// payload length, `NotAPushOpcode` for an `Op::Push` with a non-push
/// opcode, `DataTooBig` if the payload exceeds the opcode's range.
pub fn write_op(op: &Op, writer: &mut impl Writer) -> Result<(), ScriptError> {
    match op {
        Op::Code(opcode) => writer.put_u8(*opcode),
        Op::Push(opcode, data) => {
            match *opcode {
                len @ 0x01..=0x4b => {
                    if len as usize != data.len() {
                        return Err(ScriptError::InconsistentPushOp {
                            opcode: len,
                            data_len: data.len(),
                        });
                    }
                    writer.put_u8(len);
                }
                OP_PUSHDATA1 => {
                    if data.len() > 0xff {
                        return Err(ScriptError::DataTooBig(data.len()));
                    }
                    writer.put_u8(OP_PUSHDATA1);
                    writer.put_u8(data.len() as u8);
                }
                OP_PUSHDATA2 => {
                    if data.len() > 0xffff {
                        return Err(ScriptError::DataTooBig(data.len()));
                    }
                    writer.put_u8(OP_PUSHDATA2);
                    writer.put_u16_le(data.len() as u16);
                }
                OP_PUSHDATA4 => {
                    if data.len() > u32::MAX as usize {
                        return Err(ScriptError::DataTooBig(data.len()));
                    }
                    writer.put_u8(OP_PUSHDATA4);
                    writer.put_u32_le(data.len() as u32);
                }
                opcode => return Err(ScriptError::NotAPushOpcode(opcode)),
            }
            writer.put_bytes(data);
        }
    }
    Ok(())
}

/// Build the minimally-encoded push operation for a payload.
///
/// Empty data becomes OP_0, the single bytes 1..=16 and 0x81 become
/// OP_1..OP_16 and OP_1NEGATE, short payloads use the single-byte push
/// opcodes, longer ones the smallest fitting OP_PUSHDATA.
pub fn push_bytes_op(data: Vec<u8>) -> Result<Op, ScriptError> {
    Ok(match data.len() {
        0 => Op::Code(OP_0),
        1 if data[0] == 0x81 => Op::Code(OP_1NEGATE),
        1 if (1..=16).contains(&data[0]) => Op::Code(OP_1 + data[0] - 1),
        len @ 1..=0x4b => Op::Push(len as u8, data),
        len if len <= 0xff => Op::Push(OP_PUSHDATA1, data),
        len if len <= 0xffff => Op::Push(OP_PUSHDATA2, data),
        len if len <= u32::MAX as usize => Op::Push(OP_PUSHDATA4, data),
        len => return Err(ScriptError::DataTooBig(len)),
    })
}

/// Build the minimally-encoded push operation for an integer.
///
/// Script numbers are little-endian sign-magnitude: the top bit of the last
/// byte is the sign, with a zero byte appended when the magnitude already
/// uses it.
pub fn push_num_op(num: i64) -> Result<Op, ScriptError> {
    match num {
        0 => Ok(Op::Code(OP_0)),
        -1 => Ok(Op::Code(OP_1NEGATE)),
        1..=16 => Ok(Op::Code(OP_1 + num as u8 - 1)),
        _ => {
            let mut magnitude = num.unsigned_abs();
            let mut bytes = Vec::new();
            while magnitude > 0 {
                bytes.push((magnitude & 0xff) as u8);
                magnitude >>= 8;
            }
            if bytes.last().is_some_and(|b| b & 0x80 != 0) {
                bytes.push(0);
            }
            if num < 0 {
                let last = bytes.len() - 1;
                bytes[last] |= 0x80;
            }
            push_bytes_op(bytes)
        }
    }
}
