//! Field kind and label enumerations

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};

/// Numeric scalar kinds. Protobuf's zigzag and fixed-width variants collapse
/// onto the kind with the same value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// Signed 32-bit integer (`int32`, `sint32`, `sfixed32`)
    Int32,
    /// Signed 64-bit integer (`int64`, `sint64`, `sfixed64`)
    Int64,
    /// Unsigned 32-bit integer (`uint32`, `fixed32`)
    Uint32,
    /// Unsigned 64-bit integer (`uint64`, `fixed64`)
    Uint64,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
}

impl NumericKind {
    /// Canonical schema spelling.
    pub fn name(self) -> &'static str {
        match self {
            NumericKind::Int32 => "int32",
            NumericKind::Int64 => "int64",
            NumericKind::Uint32 => "uint32",
            NumericKind::Uint64 => "uint64",
            NumericKind::Float => "float",
            NumericKind::Double => "double",
        }
    }

    /// Whether this kind is an integer kind.
    pub fn is_integer(self) -> bool {
        !matches!(self, NumericKind::Float | NumericKind::Double)
    }
}

/// Field kind: the closed set of value shapes a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldKind {
    /// Integer or floating point scalar
    Numeric(NumericKind),
    /// UTF-8 string scalar
    String,
    /// Boolean scalar
    Bool,
    /// Raw bytes, base64 text on the wire
    Bytes,
    /// Enum number, validated against the enum type
    Enum,
    /// Nested message, a pblite array on the wire
    Message,
}

impl FieldKind {
    /// Parse a schema spelling such as `"uint64"` or `"message"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "int32" | "sint32" | "sfixed32" => FieldKind::Numeric(NumericKind::Int32),
            "int64" | "sint64" | "sfixed64" => FieldKind::Numeric(NumericKind::Int64),
            "uint32" | "fixed32" => FieldKind::Numeric(NumericKind::Uint32),
            "uint64" | "fixed64" => FieldKind::Numeric(NumericKind::Uint64),
            "float" => FieldKind::Numeric(NumericKind::Float),
            "double" => FieldKind::Numeric(NumericKind::Double),
            "string" => FieldKind::String,
            "bool" => FieldKind::Bool,
            "bytes" => FieldKind::Bytes,
            "enum" => FieldKind::Enum,
            "message" => FieldKind::Message,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical schema spelling.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Numeric(numeric) => numeric.name(),
            FieldKind::String => "string",
            FieldKind::Bool => "bool",
            FieldKind::Bytes => "bytes",
            FieldKind::Enum => "enum",
            FieldKind::Message => "message",
        }
    }

    /// Whether fields of this kind reference another schema type.
    pub fn needs_type_name(self) -> bool {
        matches!(self, FieldKind::Enum | FieldKind::Message)
    }
}

impl TryFrom<String> for FieldKind {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FieldKind::from_name(&value).ok_or(SchemaError::UnknownKind(value))
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.name().to_string()
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// At most one value
    #[default]
    #[serde(alias = "optional", alias = "required")]
    Singular,
    /// Ordered sequence of values
    Repeated,
}

impl Label {
    /// Whether the label is [`Label::Repeated`].
    pub fn is_repeated(self) -> bool {
        self == Label::Repeated
    }
}
