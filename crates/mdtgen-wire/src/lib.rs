//! mdtgen wire - hand-rolled protobuf encoding for Cisco model-driven telemetry
//!
//! This crate encodes the three messages a dial-out telemetry session needs,
//! without generated code:
//! - **TelemetryField**: a schema-free GPB-KV tree node
//! - **Telemetry**: one sensor-path update carrying GPB-KV rows
//! - **DialoutArgs**: the frame written on the gRPC stream
//!
//! Zero-valued scalars are never written. A decoder cannot distinguish a 0
//! counter from an unset one.

pub mod dialout;
pub mod error;
pub mod field;
pub mod message;
pub mod reader;
pub mod varint;
pub mod writer;

pub use dialout::DialoutArgs;
pub use error::{Result, WireError};
pub use field::{FieldContent, FieldValue, TelemetryField, ROW_CONTENT, ROW_KEYS};
pub use message::Telemetry;
pub use reader::{WireReader, WireValue};
pub use writer::{WireType, WireWriter};
