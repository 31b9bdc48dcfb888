//! GPB-KV telemetry tree nodes
//!
//! A [`TelemetryField`] is either a leaf carrying exactly one scalar
//! [`FieldValue`], or a container carrying child fields. Both live in the
//! [`FieldContent`] enum, so a node with children *and* a value, or with two
//! scalar kinds, cannot be constructed.

use crate::writer::WireWriter;

/// Field numbers of the `TelemetryField` message
pub mod tags {
    pub const TIMESTAMP: u32 = 1;
    pub const NAME: u32 = 2;
    pub const BYTES_VALUE: u32 = 4;
    pub const STRING_VALUE: u32 = 5;
    pub const BOOL_VALUE: u32 = 6;
    pub const UINT32_VALUE: u32 = 7;
    pub const UINT64_VALUE: u32 = 8;
    pub const SINT32_VALUE: u32 = 9;
    pub const SINT64_VALUE: u32 = 10;
    pub const DOUBLE_VALUE: u32 = 11;
    pub const FLOAT_VALUE: u32 = 12;
    pub const FIELDS: u32 = 15;

    /// Every scalar value tag, in wire order
    pub const VALUE_TAGS: [u32; 9] = [
        BYTES_VALUE,
        STRING_VALUE,
        BOOL_VALUE,
        UINT32_VALUE,
        UINT64_VALUE,
        SINT32_VALUE,
        SINT64_VALUE,
        DOUBLE_VALUE,
        FLOAT_VALUE,
    ];
}

/// Name of the identifying subtree of a row
pub const ROW_KEYS: &str = "keys";
/// Name of the payload subtree of a row
pub const ROW_CONTENT: &str = "content";

/// Scalar value of a leaf field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bytes(Vec<u8>),
    String(String),
    Bool(bool),
    Uint32(u32),
    Uint64(u64),
    Sint32(i32),
    Sint64(i64),
    Double(f64),
    Float(f32),
}

impl FieldValue {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bytes(_) => "bytes",
            FieldValue::String(_) => "string",
            FieldValue::Bool(_) => "bool",
            FieldValue::Uint32(_) => "uint32",
            FieldValue::Uint64(_) => "uint64",
            FieldValue::Sint32(_) => "sint32",
            FieldValue::Sint64(_) => "sint64",
            FieldValue::Double(_) => "double",
            FieldValue::Float(_) => "float",
        }
    }

    /// Field number this value is carried under
    pub fn tag(&self) -> u32 {
        match self {
            FieldValue::Bytes(_) => tags::BYTES_VALUE,
            FieldValue::String(_) => tags::STRING_VALUE,
            FieldValue::Bool(_) => tags::BOOL_VALUE,
            FieldValue::Uint32(_) => tags::UINT32_VALUE,
            FieldValue::Uint64(_) => tags::UINT64_VALUE,
            FieldValue::Sint32(_) => tags::SINT32_VALUE,
            FieldValue::Sint64(_) => tags::SINT64_VALUE,
            FieldValue::Double(_) => tags::DOUBLE_VALUE,
            FieldValue::Float(_) => tags::FLOAT_VALUE,
        }
    }

    /// Whether the value is the zero value of its kind (and thus not sent)
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Bytes(v) => v.is_empty(),
            FieldValue::String(v) => v.is_empty(),
            FieldValue::Bool(v) => !v,
            FieldValue::Uint32(v) => *v == 0,
            FieldValue::Uint64(v) => *v == 0,
            FieldValue::Sint32(v) => *v == 0,
            FieldValue::Sint64(v) => *v == 0,
            FieldValue::Double(v) => v.to_bits() == 0,
            FieldValue::Float(v) => v.to_bits() == 0,
        }
    }

    fn write(&self, w: &mut WireWriter) {
        let tag = self.tag();
        match self {
            FieldValue::Bytes(v) => w.bytes(tag, v),
            FieldValue::String(v) => w.string(tag, v),
            FieldValue::Bool(v) => w.bool(tag, *v),
            FieldValue::Uint32(v) => w.uint32(tag, *v),
            FieldValue::Uint64(v) => w.uint64(tag, *v),
            FieldValue::Sint32(v) => w.sint32(tag, *v),
            FieldValue::Sint64(v) => w.sint64(tag, *v),
            FieldValue::Double(v) => w.double(tag, *v),
            FieldValue::Float(v) => w.float(tag, *v),
        }
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Uint32(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Uint64(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Sint32(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Sint64(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Double(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v)
    }
}

/// What a field carries besides its timestamp and name
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldContent {
    /// Neither value nor children
    #[default]
    Empty,
    /// A single scalar
    Value(FieldValue),
    /// Nested fields, in order
    Children(Vec<TelemetryField>),
}

/// A node of the GPB-KV tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetryField {
    /// Milliseconds since the Unix epoch; 0 means unset
    pub timestamp: u64,
    /// Field name; empty means unset
    pub name: String,
    pub content: FieldContent,
}

impl TelemetryField {
    /// Create a leaf field
    pub fn leaf(name: impl Into<String>, value: impl Into<FieldValue>, timestamp: u64) -> Self {
        Self {
            timestamp,
            name: name.into(),
            content: FieldContent::Value(value.into()),
        }
    }

    /// Create a container field
    pub fn container(name: impl Into<String>, children: Vec<TelemetryField>, timestamp: u64) -> Self {
        Self {
            timestamp,
            name: name.into(),
            content: FieldContent::Children(children),
        }
    }

    /// Create an unnamed row with a `keys` and a `content` subtree, the shape
    /// NX-OS uses for one instance of a list entry.
    pub fn row(keys: Vec<TelemetryField>, content: Vec<TelemetryField>, timestamp: u64) -> Self {
        Self::container(
            "",
            vec![
                Self::container(ROW_KEYS, keys, timestamp),
                Self::container(ROW_CONTENT, content, timestamp),
            ],
            timestamp,
        )
    }

    /// Scalar value, if this is a leaf
    pub fn value(&self) -> Option<&FieldValue> {
        match &self.content {
            FieldContent::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Child fields; empty for leaves
    pub fn children(&self) -> &[TelemetryField] {
        match &self.content {
            FieldContent::Children(c) => c,
            _ => &[],
        }
    }

    /// Look up a direct child by name
    pub fn child(&self, name: &str) -> Option<&TelemetryField> {
        self.children().iter().find(|c| c.name == name)
    }

    /// Whether this field has the `keys`/`content` row shape
    pub fn is_row(&self) -> bool {
        matches!(self.children(), [k, c] if k.name == ROW_KEYS && c.name == ROW_CONTENT)
    }

    /// Encode to protobuf wire format
    pub fn encode(&self) -> Vec<u8> {
        let mut w = WireWriter::new();
        self.write_to(&mut w);
        w.finish()
    }

    /// Append this field's encoding to `w`
    pub fn write_to(&self, w: &mut WireWriter) {
        w.uint64(tags::TIMESTAMP, self.timestamp);
        w.string(tags::NAME, &self.name);

        match &self.content {
            FieldContent::Empty => {}
            FieldContent::Value(v) => v.write(w),
            FieldContent::Children(children) => {
                for child in children {
                    w.message(tags::FIELDS, &child.encode());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_encoding() {
        let field = TelemetryField::leaf("vni-id", 5000u32, 0);
        let bytes = field.encode();
        // name (tag 2) then uint32_value (tag 7)
        let mut expected = vec![0x12, 0x06];
        expected.extend_from_slice(b"vni-id");
        expected.extend_from_slice(&[0x38, 0x88, 0x27]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_timestamp_first() {
        let field = TelemetryField::leaf("x", true, 1);
        assert_eq!(field.encode(), vec![0x08, 0x01, 0x12, 0x01, b'x', 0x30, 0x01]);
    }

    #[test]
    fn test_zero_value_leaf_is_name_only() {
        let field = TelemetryField::leaf("prefixes-received", 0u32, 0);
        let mut expected = vec![0x12, 17];
        expected.extend_from_slice(b"prefixes-received");
        assert_eq!(field.encode(), expected);
    }

    #[test]
    fn test_default_field_encodes_empty() {
        assert!(TelemetryField::default().encode().is_empty());
    }

    #[test]
    fn test_nested_children_length_prefixed() {
        let child = TelemetryField::leaf("a", 1u32, 0);
        let child_bytes = child.encode();
        let parent = TelemetryField::container("p", vec![child.clone(), child], 0);
        let bytes = parent.encode();

        let mut expected = vec![0x12, 0x01, b'p'];
        for _ in 0..2 {
            expected.push(0x7A);
            expected.push(child_bytes.len() as u8);
            expected.extend_from_slice(&child_bytes);
        }
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_row_shape() {
        let row = TelemetryField::row(
            vec![TelemetryField::leaf("vni-id", 5000u32, 7)],
            vec![TelemetryField::leaf("mac-count", 45u32, 7)],
            7,
        );
        assert!(row.is_row());
        assert!(row.name.is_empty());
        assert_eq!(row.child(ROW_KEYS).unwrap().children().len(), 1);
        assert_eq!(
            row.child(ROW_CONTENT).unwrap().children()[0].value(),
            Some(&FieldValue::Uint32(45))
        );

        let not_row = TelemetryField::container("keys", vec![], 0);
        assert!(!not_row.is_row());
    }

    #[test]
    fn test_value_tags_unique() {
        let values: Vec<FieldValue> = vec![
            vec![1u8].into(),
            "s".into(),
            true.into(),
            1u32.into(),
            1u64.into(),
            1i32.into(),
            1i64.into(),
            1.0f64.into(),
            1.0f32.into(),
        ];
        let value_tags: Vec<u32> = values.iter().map(|v| v.tag()).collect();
        assert_eq!(value_tags, tags::VALUE_TAGS.to_vec());
    }

    #[test]
    fn test_is_zero() {
        assert!(FieldValue::Uint64(0).is_zero());
        assert!(FieldValue::String(String::new()).is_zero());
        assert!(FieldValue::Double(0.0).is_zero());
        assert!(!FieldValue::Double(-0.0).is_zero());
        assert!(!FieldValue::Sint32(-1).is_zero());
        assert_eq!(FieldValue::Float(1.5).type_name(), "float");
    }
}
