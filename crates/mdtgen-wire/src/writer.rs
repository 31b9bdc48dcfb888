//! Tag/wire-type framing on top of the varint primitives
//!
//! Every field is written as a key varint `(field << 3) | wire_type` followed
//! by its payload. Zero-valued scalars are skipped here so that every message
//! type gets the same "zero means not sent" behavior.

use crate::varint::{put_varint, zigzag_encode32, zigzag_encode64};

/// Protobuf wire types used by the telemetry messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::Fixed32 => "fixed32",
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            other => Err(other),
        }
    }
}

/// Append-only field writer
pub struct WireWriter {
    buffer: Vec<u8>,
}

impl WireWriter {
    /// Create a new writer
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
        }
    }

    /// Create writer with capacity hint
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Write a field key
    pub fn put_key(&mut self, field: u32, wire_type: WireType) {
        put_varint(&mut self.buffer, ((field as u64) << 3) | wire_type as u64);
    }

    /// Unsigned varint field, omitted when zero
    pub fn uint64(&mut self, field: u32, value: u64) {
        if value != 0 {
            self.put_key(field, WireType::Varint);
            put_varint(&mut self.buffer, value);
        }
    }

    /// Unsigned 32-bit varint field, omitted when zero
    pub fn uint32(&mut self, field: u32, value: u32) {
        self.uint64(field, value as u64);
    }

    /// `int64` field: two's complement, no zig-zag. Negative values take ten bytes.
    pub fn int64(&mut self, field: u32, value: i64) {
        self.uint64(field, value as u64);
    }

    /// Zig-zag `sint32` field, omitted when zero
    pub fn sint32(&mut self, field: u32, value: i32) {
        self.uint64(field, zigzag_encode32(value) as u64);
    }

    /// Zig-zag `sint64` field, omitted when zero
    pub fn sint64(&mut self, field: u32, value: i64) {
        self.uint64(field, zigzag_encode64(value));
    }

    /// Boolean field, omitted when false
    pub fn bool(&mut self, field: u32, value: bool) {
        self.uint64(field, value as u64);
    }

    /// Double field as fixed64 IEEE bits, omitted when the bit pattern is zero
    pub fn double(&mut self, field: u32, value: f64) {
        let bits = value.to_bits();
        if bits != 0 {
            self.put_key(field, WireType::Fixed64);
            self.buffer.extend_from_slice(&bits.to_le_bytes());
        }
    }

    /// Float field as fixed32 IEEE bits, omitted when the bit pattern is zero
    pub fn float(&mut self, field: u32, value: f32) {
        let bits = value.to_bits();
        if bits != 0 {
            self.put_key(field, WireType::Fixed32);
            self.buffer.extend_from_slice(&bits.to_le_bytes());
        }
    }

    /// Length-prefixed bytes, omitted when empty
    pub fn bytes(&mut self, field: u32, value: &[u8]) {
        if !value.is_empty() {
            self.message(field, value);
        }
    }

    /// Length-prefixed UTF-8 text, omitted when empty
    pub fn string(&mut self, field: u32, value: &str) {
        self.bytes(field, value.as_bytes());
    }

    /// Embedded message. Always written, even when the body is empty, so
    /// repeated entries keep their count and position.
    pub fn message(&mut self, field: u32, body: &[u8]) {
        self.put_key(field, WireType::LengthDelimited);
        put_varint(&mut self.buffer, body.len() as u64);
        self.buffer.extend_from_slice(body);
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Finish writing and return the encoded bytes
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}
