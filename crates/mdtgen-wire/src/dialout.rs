//! `MdtDialoutArgs`, the frame exchanged on the gRPC dial-out stream

use crate::error::Result;
use crate::reader::WireReader;
use crate::writer::WireWriter;

/// Field numbers of the `MdtDialoutArgs` message
pub mod tags {
    pub const REQ_ID: u32 = 1;
    pub const DATA: u32 = 2;
    pub const ERRORS: u32 = 3;
}

/// A dial-out frame wrapping one encoded [`Telemetry`](crate::Telemetry) message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DialoutArgs {
    /// Session correlation id, constant for one stream
    pub req_id: i64,
    /// Opaque encoded payload
    pub data: Vec<u8>,
    pub errors: String,
}

impl DialoutArgs {
    /// Create a frame carrying `data`
    pub fn new(req_id: i64, data: Vec<u8>) -> Self {
        Self {
            req_id,
            data,
            errors: String::new(),
        }
    }

    /// Encode to protobuf wire format
    pub fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(self.data.len() + self.errors.len() + 16);
        w.int64(tags::REQ_ID, self.req_id);
        w.bytes(tags::DATA, &self.data);
        w.string(tags::ERRORS, &self.errors);
        w.finish()
    }

    /// Decode a frame. Unknown fields are skipped.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut args = DialoutArgs::default();
        let mut reader = WireReader::new(data);

        while let Some((field, value)) = reader.next_field()? {
            match field {
                tags::REQ_ID => args.req_id = value.as_varint(field)? as i64,
                tags::DATA => args.data = value.as_bytes(field)?.to_vec(),
                tags::ERRORS => args.errors = value.as_str(field)?.to_string(),
                _ => {}
            }
        }

        Ok(args)
    }
}
