//! Minimal field reader for protobuf-framed bytes
//!
//! Walks a buffer one `(field, value)` pair at a time without any schema. The
//! generator uses it to read the collector's dial-out replies; tests use it to
//! check what the encoder put on the wire.

use crate::error::{Result, WireError};
use crate::varint::read_varint;
use crate::writer::WireType;

/// A raw field payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireValue<'a> {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(&'a [u8]),
    Fixed32(u32),
}

impl<'a> WireValue<'a> {
    pub fn wire_type(&self) -> WireType {
        match self {
            WireValue::Varint(_) => WireType::Varint,
            WireValue::Fixed64(_) => WireType::Fixed64,
            WireValue::LengthDelimited(_) => WireType::LengthDelimited,
            WireValue::Fixed32(_) => WireType::Fixed32,
        }
    }

    /// Varint payload, or a type mismatch error naming `field`
    pub fn as_varint(&self, field: u32) -> Result<u64> {
        match self {
            WireValue::Varint(v) => Ok(*v),
            other => Err(other.mismatch(field, WireType::Varint)),
        }
    }

    /// Length-delimited payload
    pub fn as_bytes(&self, field: u32) -> Result<&'a [u8]> {
        match self {
            WireValue::LengthDelimited(b) => Ok(b),
            other => Err(other.mismatch(field, WireType::LengthDelimited)),
        }
    }

    /// Length-delimited payload as UTF-8
    pub fn as_str(&self, field: u32) -> Result<&'a str> {
        let bytes = self.as_bytes(field)?;
        std::str::from_utf8(bytes).map_err(|_| WireError::InvalidUtf8(field))
    }

    fn mismatch(&self, field: u32, expected: WireType) -> WireError {
        WireError::WireTypeMismatch {
            field,
            expected: expected.as_str(),
            actual: self.wire_type().as_str(),
        }
    }
}

/// Sequential field reader
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Create a reader over `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read the next field, or `None` at the end of the buffer
    pub fn next_field(&mut self) -> Result<Option<(u32, WireValue<'a>)>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }

        let key = read_varint(self.data, &mut self.pos)?;
        let field = key >> 3;
        if field == 0 || field > u32::MAX as u64 {
            return Err(WireError::InvalidFieldNumber(field));
        }
        let field = field as u32;

        let wire_type = WireType::try_from((key & 0x07) as u8)
            .map_err(|wire_type| WireError::UnsupportedWireType { field, wire_type })?;

        let value = match wire_type {
            WireType::Varint => WireValue::Varint(read_varint(self.data, &mut self.pos)?),
            WireType::Fixed64 => {
                let raw = self.take(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(raw);
                WireValue::Fixed64(u64::from_le_bytes(buf))
            }
            WireType::Fixed32 => {
                let raw = self.take(4)?;
                let mut buf = [0u8; 4];
                buf.copy_from_slice(raw);
                WireValue::Fixed32(u32::from_le_bytes(buf))
            }
            WireType::LengthDelimited => {
                let length = read_varint(self.data, &mut self.pos)?;
                if length > self.remaining() as u64 {
                    return Err(WireError::LengthOverrun {
                        length,
                        remaining: self.remaining(),
                    });
                }
                WireValue::LengthDelimited(self.take(length as usize)?)
            }
        };

        Ok(Some((field, value)))
    }

    /// Read every remaining field
    pub fn read_all(&mut self) -> Result<Vec<(u32, WireValue<'a>)>> {
        let mut fields = Vec::new();
        while let Some(f) = self.next_field()? {
            fields.push(f);
        }
        Ok(fields)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(WireError::BufferUnderflow);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::WireWriter;

    #[test]
    fn test_reads_every_wire_type() {
        let mut w = WireWriter::new();
        w.uint64(1, 300);
        w.double(11, 2.5);
        w.string(2, "abc");
        w.float(12, 1.25);
        let data = w.finish();

        let fields = WireReader::new(&data).read_all().unwrap();
        assert_eq!(
            fields,
            vec![
                (1, WireValue::Varint(300)),
                (11, WireValue::Fixed64(2.5f64.to_bits())),
                (2, WireValue::LengthDelimited(b"abc")),
                (12, WireValue::Fixed32(1.25f32.to_bits())),
            ]
        );
    }

    #[test]
    fn test_length_overrun() {
        let data = [0x12, 0x05, b'a'];
        let err = WireReader::new(&data).next_field().unwrap_err();
        assert_eq!(
            err,
            WireError::LengthOverrun {
                length: 5,
                remaining: 1
            }
        );
    }

    #[test]
    fn test_unsupported_wire_type() {
        // field 1, wire type 3 (start group)
        let data = [0x0B];
        let err = WireReader::new(&data).next_field().unwrap_err();
        assert_eq!(
            err,
            WireError::UnsupportedWireType {
                field: 1,
                wire_type: 3
            }
        );
    }

    #[test]
    fn test_field_zero_rejected() {
        let data = [0x00, 0x01];
        assert_eq!(
            WireReader::new(&data).next_field().unwrap_err(),
            WireError::InvalidFieldNumber(0)
        );
    }

    #[test]
    fn test_truncated_fixed64() {
        let data = [0x09, 0x00, 0x00];
        assert_eq!(
            WireReader::new(&data).next_field().unwrap_err(),
            WireError::BufferUnderflow
        );
    }

    #[test]
    fn test_type_mismatch() {
        let v = WireValue::Varint(1);
        assert!(matches!(
            v.as_bytes(3),
            Err(WireError::WireTypeMismatch { field: 3, .. })
        ));
        assert_eq!(v.as_varint(3).unwrap(), 1);
    }
}
