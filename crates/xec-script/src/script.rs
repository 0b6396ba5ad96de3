//! Script bytecode newtype and the standard output templates.

use std::fmt;

use xec_primitives::ser::{BytesReader, BytesWriter, Writer};

use crate::address::Address;
use crate::op::{push_bytes_op, read_op, write_op, Op};
use crate::opcodes::*;
use crate::ScriptError;

/// Script bytecode.
///
/// A `Script` is an opaque byte buffer; it only gains structure when iterated
/// op by op via [`Script::ops`]. Malformed bytecode is representable and only
/// surfaces as an error during iteration.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Script {
    bytecode: Vec<u8>,
}

impl Script {
    /// Create a script from raw bytecode.
    pub fn new(bytecode: Vec<u8>) -> Self {
        Script { bytecode }
    }

    /// Parse a script from its hex encoding.
    pub fn from_hex(s: &str) -> Result<Self, ScriptError> {
        Ok(Script::new(hex::decode(s).map_err(xec_primitives::PrimitivesError::from)?))
    }

    /// Hex encoding of the bytecode.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytecode)
    }

    /// Assemble a script from a sequence of operations.
    pub fn from_ops<I>(ops: I) -> Result<Self, ScriptError>
    where
        I: IntoIterator<Item = Op>,
    {
        let mut writer = BytesWriter::new();
        for op in ops {
            write_op(&op, &mut writer)?;
        }
        Ok(Script::new(writer.into_bytes()))
    }

    /// The raw bytecode.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytecode
    }

    /// Consume the script, returning the bytecode.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytecode
    }

    /// Bytecode length in bytes.
    pub fn len(&self) -> usize {
        self.bytecode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }

    /// Iterate over the operations of this script.
    ///
    /// The cursor is restartable: each call starts a fresh iteration.
    /// Iteration stops after yielding the first malformed op.
    pub fn ops(&self) -> Ops<'_> {
        Ops {
            reader: BytesReader::new(&self.bytecode),
            failed: false,
        }
    }

    /// Write the script prefixed with its VarInt byte length.
    ///
    /// This is the wire form used inside transactions.
    pub fn write_with_size(&self, writer: &mut impl Writer) {
        writer.put_varint(self.bytecode.len() as u64);
        writer.put_bytes(&self.bytecode);
    }

    /// Return the bytecode strictly after the `n_codesep`-th OP_CODESEPARATOR.
    ///
    /// Later separators are kept. Used to build the script code of a sighash
    /// preimage when the spending input has executed OP_CODESEPARATOR.
    ///
    /// # Arguments
    /// * `n_codesep` - Zero-based index of the separator to cut at.
    ///
    /// # Returns
    /// The remaining script, or `CodesepNotFound` if the script has fewer
    /// than `n_codesep + 1` separators.
    pub fn cut_out_codesep(&self, n_codesep: usize) -> Result<Script, ScriptError> {
        let mut reader = BytesReader::new(&self.bytecode);
        let mut found = 0usize;
        while reader.remaining() > 0 {
            let op = read_op(&mut reader)?;
            if op == Op::Code(OP_CODESEPARATOR) {
                if found == n_codesep {
                    return Ok(Script::new(reader.remaining_bytes().to_vec()));
                }
                found += 1;
            }
        }
        Err(ScriptError::CodesepNotFound { wanted: n_codesep, found })
    }

    /// Return this script with every OP_CODESEPARATOR opcode removed.
    ///
    /// Legacy sighash preimages serialize the script code in this stripped
    /// form. Push payloads are untouched; only the opcode itself is dropped.
    pub fn strip_codeseps(&self) -> Result<Script, ScriptError> {
        let mut writer = BytesWriter::new();
        for op in self.ops() {
            let op = op?;
            if op == Op::Code(OP_CODESEPARATOR) {
                continue;
            }
            write_op(&op, &mut writer)?;
        }
        Ok(Script::new(writer.into_bytes()))
    }

    /// Whether this is exactly the P2SH template `HASH160 <20 bytes> EQUAL`.
    pub fn is_p2sh(&self) -> bool {
        self.bytecode.len() == 23
            && self.bytecode[0] == OP_HASH160
            && self.bytecode[1] == 0x14
            && self.bytecode[22] == OP_EQUAL
    }

    /// Whether this is exactly the P2PKH template
    /// `DUP HASH160 <20 bytes> EQUALVERIFY CHECKSIG`.
    pub fn is_p2pkh(&self) -> bool {
        self.bytecode.len() == 25
            && self.bytecode[0] == OP_DUP
            && self.bytecode[1] == OP_HASH160
            && self.bytecode[2] == 0x14
            && self.bytecode[23] == OP_EQUALVERIFY
            && self.bytecode[24] == OP_CHECKSIG
    }

    /// Build a P2PKH output script for a 20-byte public key hash.
    pub fn p2pkh(hash: &[u8]) -> Result<Script, ScriptError> {
        let hash = fixed_hash(hash)?;
        Ok(Script::new(p2pkh_bytecode(&hash)))
    }

    /// Build a P2SH output script for a 20-byte script hash.
    pub fn p2sh(hash: &[u8]) -> Result<Script, ScriptError> {
        let hash = fixed_hash(hash)?;
        Ok(Script::new(p2sh_bytecode(&hash)))
    }

    /// Build a P2PK output script for a public key.
    pub fn p2pk(pubkey: &[u8]) -> Result<Script, ScriptError> {
        Script::from_ops([push_bytes_op(pubkey.to_vec())?, Op::Code(OP_CHECKSIG)])
    }

    /// Build the input script spending a P2PKH output: `<sig> <pubkey>`.
    pub fn p2pkh_spend(pubkey: &[u8], sig: &[u8]) -> Result<Script, ScriptError> {
        Script::from_ops([
            push_bytes_op(sig.to_vec())?,
            push_bytes_op(pubkey.to_vec())?,
        ])
    }

    /// Build the output script paying to a parsed legacy address.
    pub fn from_address(address: &str) -> Result<Script, ScriptError> {
        Ok(address.parse::<Address>()?.to_script())
    }
}

pub(crate) fn p2pkh_bytecode(hash: &[u8; 20]) -> Vec<u8> {
    let mut bytecode = Vec::with_capacity(25);
    bytecode.extend([OP_DUP, OP_HASH160, 0x14]);
    bytecode.extend(hash);
    bytecode.extend([OP_EQUALVERIFY, OP_CHECKSIG]);
    bytecode
}

pub(crate) fn p2sh_bytecode(hash: &[u8; 20]) -> Vec<u8> {
    let mut bytecode = Vec::with_capacity(23);
    bytecode.extend([OP_HASH160, 0x14]);
    bytecode.extend(hash);
    bytecode.push(OP_EQUAL);
    bytecode
}

fn fixed_hash(hash: &[u8]) -> Result<[u8; 20], ScriptError> {
    if hash.len() != 20 {
        return Err(ScriptError::InvalidLength { expected: 20, got: hash.len() });
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(hash);
    Ok(out)
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytecode: Vec<u8>) -> Self {
        Script::new(bytecode)
    }
}

/// Restartable op cursor over a script, yielding `Result<Op, ScriptError>`.
pub struct Ops<'a> {
    reader: BytesReader<'a>,
    failed: bool,
}

impl Iterator for Ops<'_> {
    type Item = Result<Op, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.remaining() == 0 {
            return None;
        }
        let result = read_op(&mut self.reader);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}
