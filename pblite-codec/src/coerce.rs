//! Conversions between wire values and typed scalars

use crate::value::ScalarValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pblite_format::constants::{FLOAT_INFINITY, FLOAT_NAN, FLOAT_NEG_INFINITY};
use pblite_format::wire::json_type_name;
use pblite_format::{EnumDescriptor, FieldDescriptor, FieldKind, NumericKind, PbliteError, Result};
use serde_json::{Number, Value};

/// Convert a wire value to the scalar a field of `field.kind` holds,
/// validating ranges, signs and enum membership.
pub fn scalar_from_wire(
    field: &FieldDescriptor,
    enum_type: Option<&EnumDescriptor>,
    value: &Value,
) -> Result<ScalarValue> {
    match field.kind {
        FieldKind::Numeric(kind) if kind.is_integer() => integer_from_wire(kind, value),
        FieldKind::Numeric(kind) => float_from_wire(kind, value).map(ScalarValue::Float),
        FieldKind::String => match value {
            Value::String(text) => Ok(ScalarValue::String(text.clone())),
            other => Err(mismatch("string", other)),
        },
        FieldKind::Bool => match value {
            Value::Bool(flag) => Ok(ScalarValue::Bool(*flag)),
            Value::Number(number) => match number.as_u64() {
                Some(0) => Ok(ScalarValue::Bool(false)),
                Some(1) => Ok(ScalarValue::Bool(true)),
                _ => Err(mismatch("bool", value)),
            },
            other => Err(mismatch("bool", other)),
        },
        FieldKind::Bytes => match value {
            Value::String(text) => decode_bytes(text).map(ScalarValue::Bytes),
            other => Err(mismatch("bytes", other)),
        },
        FieldKind::Enum => {
            let number = match wire_integer(value, false)? {
                Some(number) => number,
                None => return Err(mismatch("enum", value)),
            };
            enum_from_number(enum_type, number)
        }
        FieldKind::Message => Err(mismatch("message", value)),
    }
}

/// Like [`scalar_from_wire`], but enum fields also accept symbolic names.
/// Used by the named JSON view.
pub fn scalar_from_named(
    field: &FieldDescriptor,
    enum_type: Option<&EnumDescriptor>,
    value: &Value,
) -> Result<ScalarValue> {
    match (field.kind, value, enum_type) {
        (FieldKind::Enum, Value::String(name), Some(descriptor)) => descriptor
            .number_of(name)
            .map(ScalarValue::Enum)
            .ok_or_else(|| PbliteError::UnknownEnumName {
                enum_name: descriptor.name.clone(),
                name: name.clone(),
            }),
        _ => scalar_from_wire(field, enum_type, value),
    }
}

/// Wire form of a scalar. Bytes become standard base64; non-finite floats
/// use their jspb string spelling.
pub fn scalar_to_wire(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Int(v) => Value::from(*v),
        ScalarValue::Uint(v) => Value::from(*v),
        ScalarValue::Float(v) => float_to_wire(*v),
        ScalarValue::Bool(flag) => Value::Bool(*flag),
        ScalarValue::String(text) => Value::String(text.clone()),
        ScalarValue::Bytes(bytes) => Value::String(encode_bytes(bytes)),
        ScalarValue::Enum(v) => Value::from(*v),
    }
}

/// Wire value an unset singular field encodes as.
pub fn default_wire(field: &FieldDescriptor, enum_type: Option<&EnumDescriptor>) -> Value {
    if let Some(default) = &field.default {
        return default.clone();
    }
    match field.kind {
        FieldKind::Numeric(kind) if kind.is_integer() => Value::from(0),
        FieldKind::Numeric(_) => Value::from(0.0),
        FieldKind::String | FieldKind::Bytes => Value::String(String::new()),
        FieldKind::Bool => Value::Bool(false),
        FieldKind::Enum => Value::from(enum_type.map_or(0, EnumDescriptor::default_number)),
        FieldKind::Message => Value::Null,
    }
}

/// Decode standard padded base64 (RFC 4648).
pub fn decode_bytes(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|err| PbliteError::InvalidBase64(err.to_string()))
}

/// Encode bytes as standard padded base64 (RFC 4648).
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

fn mismatch(expected: &'static str, found: &Value) -> PbliteError {
    PbliteError::TypeMismatch {
        expected,
        found: json_type_name(found),
    }
}

/// Integer carried by a JSON number, or by a decimal string when
/// `allow_string` is set. `Ok(None)` for any other shape.
fn wire_integer(value: &Value, allow_string: bool) -> Result<Option<i128>> {
    match value {
        Value::Number(number) => {
            if let Some(v) = number.as_i64() {
                Ok(Some(i128::from(v)))
            } else if let Some(v) = number.as_u64() {
                Ok(Some(i128::from(v)))
            } else {
                Ok(None)
            }
        }
        Value::String(text) if allow_string => {
            text.trim()
                .parse::<i128>()
                .map(Some)
                .map_err(|_| PbliteError::TypeMismatch {
                    expected: "integer string",
                    found: "str",
                })
        }
        _ => Ok(None),
    }
}

fn integer_from_wire(kind: NumericKind, value: &Value) -> Result<ScalarValue> {
    // 64-bit integers travel as decimal strings when they exceed JS precision.
    let allow_string = matches!(kind, NumericKind::Int64 | NumericKind::Uint64);
    let number = match wire_integer(value, allow_string)? {
        Some(number) => number,
        None => return Err(mismatch(kind.name(), value)),
    };

    let out_of_range = || PbliteError::OutOfRange {
        kind: kind.name(),
        value: number.to_string(),
    };

    match kind {
        NumericKind::Int32 => i32::try_from(number)
            .map(|v| ScalarValue::Int(i64::from(v)))
            .map_err(|_| out_of_range()),
        NumericKind::Int64 => i64::try_from(number)
            .map(ScalarValue::Int)
            .map_err(|_| out_of_range()),
        NumericKind::Uint32 | NumericKind::Uint64 => {
            if number < 0 {
                return Err(PbliteError::NegativeUnsigned(
                    i64::try_from(number).unwrap_or(i64::MIN),
                ));
            }
            let limit = if kind == NumericKind::Uint32 {
                i128::from(u32::MAX)
            } else {
                i128::from(u64::MAX)
            };
            if number > limit {
                return Err(out_of_range());
            }
            u64::try_from(number)
                .map(ScalarValue::Uint)
                .map_err(|_| out_of_range())
        }
        NumericKind::Float | NumericKind::Double => Err(mismatch(kind.name(), value)),
    }
}

fn float_from_wire(kind: NumericKind, value: &Value) -> Result<f64> {
    let v = match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| mismatch(kind.name(), value))?,
        Value::String(text) => match text.as_str() {
            FLOAT_NAN => f64::NAN,
            FLOAT_INFINITY => f64::INFINITY,
            FLOAT_NEG_INFINITY => f64::NEG_INFINITY,
            _ => return Err(mismatch(kind.name(), value)),
        },
        other => return Err(mismatch(kind.name(), other)),
    };

    if kind == NumericKind::Float {
        let narrowed = v as f32;
        if v.is_finite() && narrowed.is_infinite() {
            return Err(PbliteError::OutOfRange {
                kind: kind.name(),
                value: v.to_string(),
            });
        }
        return Ok(f64::from(narrowed));
    }
    Ok(v)
}

fn float_to_wire(v: f64) -> Value {
    match Number::from_f64(v) {
        Some(number) => Value::Number(number),
        None if v.is_nan() => Value::String(FLOAT_NAN.to_string()),
        None if v > 0.0 => Value::String(FLOAT_INFINITY.to_string()),
        None => Value::String(FLOAT_NEG_INFINITY.to_string()),
    }
}

fn enum_from_number(enum_type: Option<&EnumDescriptor>, number: i128) -> Result<ScalarValue> {
    let enum_name = || enum_type.map_or_else(|| "enum".to_string(), |e| e.name.clone());
    let value = i32::try_from(number).map_err(|_| PbliteError::OutOfRange {
        kind: "enum",
        value: number.to_string(),
    })?;

    match enum_type {
        Some(descriptor) if !descriptor.contains(value) => Err(PbliteError::UnknownEnumValue {
            enum_name: enum_name(),
            value: i64::from(value),
        }),
        _ => Ok(ScalarValue::Enum(value)),
    }
}
