//! Wire-level view of a pblite message array
//!
//! A message is a JSON array. Element `i` (0-based, after an optional leading
//! sentinel such as a message-type tag) carries field number `i + 1`. If the
//! last element is an object, it is an overflow map from decimal field number
//! to value, used by senders for sparse high-numbered fields.

use crate::constants::{MAX_FIELD_NUMBER, MIN_FIELD_NUMBER};
use crate::error::{PbliteError, Result};
use serde_json::{Map, Value};

/// A message array split into its positional part and its overflow map.
#[derive(Debug, Clone, Copy)]
pub struct MessageView<'a> {
    /// Positional elements; index 0 is field 1
    pub positional: &'a [Value],
    /// Trailing overflow map, if present
    pub overflow: Option<&'a Map<String, Value>>,
}

/// One `(field number, value)` pair produced by [`MessageView::entries`].
#[derive(Debug, Clone, Copy)]
pub enum FieldEntry<'a> {
    /// Usable field number and its (non-null) value
    Field {
        /// Field number
        number: u32,
        /// Wire value
        value: &'a Value,
    },
    /// Overflow map entry whose key is not a field number
    InvalidKey {
        /// Raw key
        key: &'a str,
        /// Wire value
        value: &'a Value,
    },
}

impl<'a> MessageView<'a> {
    /// Split `value` into positional elements and overflow map.
    pub fn parse(value: &'a Value, ignore_first_item: bool) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| PbliteError::NotAnArray(json_type_name(value)))?;

        let mut positional = items.as_slice();
        if ignore_first_item && !positional.is_empty() {
            positional = &positional[1..];
        }

        let mut overflow = None;
        if let Some((Value::Object(map), rest)) = positional.split_last() {
            overflow = Some(map);
            positional = rest;
        }

        Ok(Self {
            positional,
            overflow,
        })
    }

    /// Entries in decode order: positional first, then the overflow map in its
    /// own key order. `null` values are dropped; they mean "absent".
    pub fn entries(&self) -> impl Iterator<Item = FieldEntry<'a>> + 'a {
        let (items, overflow) = (self.positional, self.overflow);

        let positional = items
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .filter_map(|(idx, value)| {
                let number = u32::try_from(idx + 1).ok()?;
                Some(FieldEntry::Field { number, value })
            });

        let overflow = overflow
            .into_iter()
            .flat_map(|map| map.iter())
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| match parse_field_number(key) {
                Ok(number) => FieldEntry::Field { number, value },
                Err(_) => FieldEntry::InvalidKey { key, value },
            });

        positional.chain(overflow)
    }
}

/// Parse an overflow map key as a field number.
pub fn parse_field_number(key: &str) -> Result<u32> {
    match key.trim().parse::<u32>() {
        Ok(number) if (MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER).contains(&number) => Ok(number),
        _ => Err(PbliteError::InvalidFieldNumber(key.to_string())),
    }
}

/// Assemble a message array from positional elements and overflow entries.
/// An empty overflow map is omitted.
pub fn assemble_message(mut positional: Vec<Value>, overflow: Map<String, Value>) -> Value {
    if !overflow.is_empty() {
        positional.push(Value::Object(overflow));
    }
    Value::Array(positional)
}

/// Whether a value carries no information: numeric zero, `false`, `""` or `[]`.
pub fn is_trivial(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

/// Short JSON type name for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
