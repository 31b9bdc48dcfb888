//! Top-level `Telemetry` message carrying GPB-KV rows

use crate::field::TelemetryField;
use crate::writer::WireWriter;

/// Field numbers of the `Telemetry` message
pub mod tags {
    pub const NODE_ID_STR: u32 = 1;
    pub const SUBSCRIPTION_ID_STR: u32 = 3;
    pub const ENCODING_PATH: u32 = 6;
    pub const COLLECTION_ID: u32 = 8;
    pub const COLLECTION_START_TIME: u32 = 9;
    pub const MSG_TIMESTAMP: u32 = 10;
    pub const DATA_GPBKV: u32 = 11;
    pub const COLLECTION_END_TIME: u32 = 13;
}

/// One telemetry update for a single sensor path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Telemetry {
    pub node_id: String,
    pub subscription_id: String,
    pub encoding_path: String,
    pub collection_id: u64,
    /// Milliseconds since the Unix epoch
    pub collection_start_time: u64,
    pub msg_timestamp: u64,
    pub collection_end_time: u64,
    pub data_gpbkv: Vec<TelemetryField>,
}

impl Telemetry {
    /// Encode to protobuf wire format
    pub fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(256);

        w.string(tags::NODE_ID_STR, &self.node_id);
        w.string(tags::SUBSCRIPTION_ID_STR, &self.subscription_id);
        w.string(tags::ENCODING_PATH, &self.encoding_path);
        w.uint64(tags::COLLECTION_ID, self.collection_id);
        w.uint64(tags::COLLECTION_START_TIME, self.collection_start_time);
        w.uint64(tags::MSG_TIMESTAMP, self.msg_timestamp);

        for field in &self.data_gpbkv {
            w.message(tags::DATA_GPBKV, &field.encode());
        }

        w.uint64(tags::COLLECTION_END_TIME, self.collection_end_time);

        w.finish()
    }
}
