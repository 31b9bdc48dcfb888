//! Wire decoding error types

use thiserror::Error;

/// Errors raised while reading protobuf-framed bytes.
///
/// Encoding never fails; only the reader side can observe malformed input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Buffer underflow: unexpected end of data")]
    BufferUnderflow,

    #[error("Varint overflow")]
    VarintOverflow,

    #[error("Invalid field number: {0}")]
    InvalidFieldNumber(u64),

    #[error("Unsupported wire type {wire_type} for field {field}")]
    UnsupportedWireType { field: u32, wire_type: u8 },

    #[error("Length {length} exceeds remaining {remaining} bytes")]
    LengthOverrun { length: u64, remaining: usize },

    #[error("Field {field} expected wire type {expected}, got {actual}")]
    WireTypeMismatch {
        field: u32,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid UTF-8 in field {0}")]
    InvalidUtf8(u32),
}

/// Result type for wire operations
pub type Result<T> = std::result::Result<T, WireError>;
