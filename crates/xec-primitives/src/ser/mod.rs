//! Binary serialization for the eCash wire protocol.
//!
//! Provides the `Writer` trait with two implementations — `BytesWriter`
//! accumulating into a buffer and `LengthWriter` counting bytes only — plus
//! the cursor-based `BytesReader`. Integers are little-endian except where a
//! big-endian method is named explicitly; lengths use Bitcoin's
//! VarInt/CompactSize encoding.

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Sink for wire-format serialization.
///
/// Objects serialize themselves by calling the `put_*` methods; swapping the
/// writer implementation switches between producing bytes (`BytesWriter`) and
/// measuring size (`LengthWriter`) without touching the serialization code.
pub trait Writer {
    /// Append raw bytes.
    fn put_bytes(&mut self, bytes: &[u8]);

    /// Append a single byte.
    fn put_u8(&mut self, value: u8) {
        self.put_bytes(&[value]);
    }

    /// Append a little-endian u16 (2 bytes).
    fn put_u16_le(&mut self, value: u16) {
        self.put_bytes(&value.to_le_bytes());
    }

    /// Append a little-endian u32 (4 bytes).
    fn put_u32_le(&mut self, value: u32) {
        self.put_bytes(&value.to_le_bytes());
    }

    /// Append a big-endian u32 (4 bytes).
    fn put_u32_be(&mut self, value: u32) {
        self.put_bytes(&value.to_be_bytes());
    }

    /// Append a little-endian u64 (8 bytes).
    fn put_u64_le(&mut self, value: u64) {
        self.put_bytes(&value.to_le_bytes());
    }

    /// Append a VarInt (1, 3, 5 or 9 bytes depending on magnitude).
    ///
    /// Values below 0xfd are a single byte; larger values get a 0xfd/0xfe/0xff
    /// prefix followed by a little-endian u16/u32/u64.
    fn put_varint(&mut self, value: u64) {
        if value < 0xfd {
            self.put_u8(value as u8);
        } else if value <= 0xffff {
            self.put_u8(0xfd);
            self.put_u16_le(value as u16);
        } else if value <= 0xffff_ffff {
            self.put_u8(0xfe);
            self.put_u32_le(value as u32);
        } else {
            self.put_u8(0xff);
            self.put_u64_le(value);
        }
    }
}

/// Return the wire-format byte length of a VarInt without encoding it.
pub fn varint_size(value: u64) -> usize {
    if value < 0xfd {
        1
    } else if value <= 0xffff {
        3
    } else if value <= 0xffff_ffff {
        5
    } else {
        9
    }
}

// ---------------------------------------------------------------------------
// BytesWriter
// ---------------------------------------------------------------------------

/// A buffer-based writer producing the actual serialization.
pub struct BytesWriter {
    buf: Vec<u8>,
}

impl BytesWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        BytesWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    ///
    /// Pair with `LengthWriter` to serialize with a single exact allocation.
    ///
    /// # Arguments
    /// * `capacity` - Initial byte capacity of the internal buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        BytesWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Writer for BytesWriter {
    fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }
}

impl Default for BytesWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// LengthWriter
// ---------------------------------------------------------------------------

/// A writer that only counts bytes.
///
/// Running a serializer against a `LengthWriter` yields the exact size of the
/// encoding without allocating, which drives both `ser_size` queries and the
/// pre-sizing of `BytesWriter` buffers.
pub struct LengthWriter {
    length: usize,
}

impl LengthWriter {
    /// Create a new counter at zero.
    pub fn new() -> Self {
        LengthWriter { length: 0 }
    }

    /// Return the number of bytes written so far.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Writer for LengthWriter {
    fn put_bytes(&mut self, bytes: &[u8]) {
        self.length += bytes.len();
    }

    fn put_u8(&mut self, _value: u8) {
        self.length += 1;
    }
}

impl Default for LengthWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// BytesReader
// ---------------------------------------------------------------------------

/// A cursor-based reader for eCash wire-format binary data.
///
/// Wraps a byte slice and maintains a read position. Reads past the end
/// return `PrimitivesError::NotEnoughBytes` rather than panicking.
pub struct BytesReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BytesReader<'a> {
    /// Create a new reader over the given byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        BytesReader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read.
    ///
    /// # Returns
    /// A byte slice of length `n`, or `NotEnoughBytes` if insufficient data
    /// remains.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::NotEnoughBytes {
                requested: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size byte array and advance the position.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte and advance the position.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Read a little-endian u16 and advance the position by 2 bytes.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32 and advance the position by 4 bytes.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a big-endian u32 and advance the position by 4 bytes.
    pub fn read_u32_be(&mut self) -> Result<u32, PrimitivesError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian u64 and advance the position by 8 bytes.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3],
            bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    /// Read a VarInt and advance the position accordingly.
    pub fn read_varint(&mut self) -> Result<u64, PrimitivesError> {
        let first = self.read_u8()?;
        match first {
            0xff => self.read_u64_le(),
            0xfe => Ok(self.read_u32_le()? as u64),
            0xfd => Ok(self.read_u16_le()? as u64),
            b => Ok(b as u64),
        }
    }

    /// Return the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Return the unread tail of the input without advancing.
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_encoding() {
        let cases: Vec<(u64, Vec<u8>)> = vec![
            (0, vec![0x00]),
            (1, vec![0x01]),
            (252, vec![0xfc]),
            (253, vec![0xfd, 0xfd, 0x00]),
            (65535, vec![0xfd, 0xff, 0xff]),
            (65536, vec![0xfe, 0x00, 0x00, 0x01, 0x00]),
            (4294967295, vec![0xfe, 0xff, 0xff, 0xff, 0xff]),
            (4294967296, vec![0xff, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]),
            (u64::MAX, vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
        ];

        for (value, expected) in cases {
            let mut writer = BytesWriter::new();
            writer.put_varint(value);
            assert_eq!(writer.as_bytes(), expected, "encoding mismatch for {}", value);
            assert_eq!(varint_size(value), expected.len(), "size mismatch for {}", value);

            let mut reader = BytesReader::new(&expected);
            assert_eq!(reader.read_varint().unwrap(), value);
            assert_eq!(reader.remaining(), 0);
        }
    }

    #[test]
    fn test_writer_reader_roundtrip() {
        let mut writer = BytesWriter::new();
        writer.put_u8(0x42);
        writer.put_u16_le(0x1234);
        writer.put_u32_le(0xDEADBEEF);
        writer.put_u32_be(0xCAFEBABE);
        writer.put_u64_le(0x0102030405060708);
        writer.put_varint(300);
        writer.put_bytes(b"hello");

        let data = writer.into_bytes();
        let mut reader = BytesReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_le().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.read_u32_be().unwrap(), 0xCAFEBABE);
        assert_eq!(reader.read_u64_le().unwrap(), 0x0102030405060708);
        assert_eq!(reader.read_varint().unwrap(), 300);
        assert_eq!(reader.read_bytes(5).unwrap(), b"hello");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_length_writer_matches_bytes_writer() {
        let mut bytes = BytesWriter::new();
        let mut length = LengthWriter::new();
        for w in [&mut bytes as &mut dyn Writer, &mut length as &mut dyn Writer] {
            w.put_u8(7);
            w.put_u32_le(0xfeedface);
            w.put_varint(65536);
            w.put_bytes(&[1, 2, 3]);
        }
        assert_eq!(length.length(), bytes.len());
    }

    #[test]
    fn test_reader_big_endian() {
        let mut reader = BytesReader::new(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(reader.read_u32_be().unwrap(), 0x01020304);
    }

    #[test]
    fn test_reader_not_enough_bytes() {
        let mut reader = BytesReader::new(&[0x01, 0x02]);
        match reader.read_u32_le() {
            Err(PrimitivesError::NotEnoughBytes { requested, available }) => {
                assert_eq!(requested, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected NotEnoughBytes, got {:?}", other.map(|_| ())),
        }
        // Failed read must not consume anything.
        assert_eq!(reader.read_u16_le().unwrap(), 0x0201);
    }

    #[test]
    fn test_reader_remaining_bytes() {
        let mut reader = BytesReader::new(&[0xaa, 0xbb, 0xcc]);
        reader.read_u8().unwrap();
        assert_eq!(reader.remaining_bytes(), &[0xbb, 0xcc]);
        assert_eq!(reader.remaining(), 2);
    }
}
