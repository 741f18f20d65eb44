//! Typed scalar values held by message slots

/// A decoded scalar field value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Signed integer (`int32`, `int64` and their variants)
    Int(i64),
    /// Unsigned integer (`uint32`, `uint64` and their variants)
    Uint(u64),
    /// Floating point (`float` values are stored rounded to `f32`)
    Float(f64),
    /// Boolean
    Bool(bool),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Enum number
    Enum(i32),
}

impl ScalarValue {
    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Int(_) => "int",
            ScalarValue::Uint(_) => "uint",
            ScalarValue::Float(_) => "float",
            ScalarValue::Bool(_) => "bool",
            ScalarValue::String(_) => "string",
            ScalarValue::Bytes(_) => "bytes",
            ScalarValue::Enum(_) => "enum",
        }
    }

    /// String contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(text) => Some(text),
            _ => None,
        }
    }

    /// Byte contents, if this is a bytes value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ScalarValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Signed view of any integer-like value that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ScalarValue::Int(v) => Some(v),
            ScalarValue::Uint(v) => i64::try_from(v).ok(),
            ScalarValue::Enum(v) => Some(i64::from(v)),
            _ => None,
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int(i64::from(value))
    }
}

impl From<u64> for ScalarValue {
    fn from(value: u64) -> Self {
        ScalarValue::Uint(value)
    }
}

impl From<u32> for ScalarValue {
    fn from(value: u32) -> Self {
        ScalarValue::Uint(u64::from(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

impl From<Vec<u8>> for ScalarValue {
    fn from(value: Vec<u8>) -> Self {
        ScalarValue::Bytes(value)
    }
}
