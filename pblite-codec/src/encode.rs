//! Deterministic pblite encoder
//!
//! The output array has one element per field number from 1 through the
//! highest declared field, with `null` at numbers the schema does not
//! declare. Unset singular scalars encode as their declared default. Unset
//! singular messages encode as their all-defaults array when the message
//! supplies one through [`Message::default_message`], otherwise as `null`.
//!
//! By default no overflow map is produced, even for sparse high field
//! numbers: peers that round-trip dense schemas expect purely positional
//! arrays. [`EncodeOptions::overflow_threshold`] opts into moving high fields
//! into a trailing overflow map instead of padding up to them.

use crate::coerce::{default_wire, scalar_to_wire};
use crate::message::Message;
use pblite_format::wire::assemble_message;
use pblite_format::{FieldDescriptor, FieldKind};
use serde_json::{Map, Value};

/// Encoding options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Fields numbered above this go into a trailing overflow map instead of
    /// being placed positionally. `None` never emits an overflow map.
    pub overflow_threshold: Option<u32>,
}

/// Encode `source` as a pblite array.
pub fn encode(source: &dyn Message) -> Value {
    encode_with(source, &EncodeOptions::default())
}

/// Encode `source` as a pblite array with explicit options.
pub fn encode_with(source: &dyn Message, opts: &EncodeOptions) -> Value {
    let schema = source.schema();
    let positional_len = match opts.overflow_threshold {
        Some(threshold) => schema.max_field_number().min(threshold),
        None => schema.max_field_number(),
    };

    let mut positional = Vec::with_capacity(positional_len as usize);
    let mut overflow = Map::new();

    for field in schema.fields() {
        let value = encode_field(source, field, opts);

        if opts.overflow_threshold.is_some_and(|threshold| field.number > threshold) {
            if !value.is_null() {
                overflow.insert(field.number.to_string(), value);
            }
            continue;
        }

        let index = field.number as usize - 1;
        if positional.len() < index {
            positional.resize(index, Value::Null);
        }
        positional.push(value);
    }

    assemble_message(positional, overflow)
}

fn encode_field(source: &dyn Message, field: &FieldDescriptor, opts: &EncodeOptions) -> Value {
    match (field.kind, field.is_repeated()) {
        (FieldKind::Message, true) => Value::Array(
            (0..source.message_count(field))
                .filter_map(|index| source.message_at(field, index))
                .map(|child| encode_with(child, opts))
                .collect(),
        ),
        (_, true) => Value::Array(source.repeated(field).iter().map(scalar_to_wire).collect()),
        (FieldKind::Message, false) => match source.message(field) {
            Some(child) => encode_with(child, opts),
            None => source
                .default_message(field)
                .map_or(Value::Null, |child| encode_with(child.as_ref(), opts)),
        },
        (_, false) => match source.get(field) {
            Some(value) => scalar_to_wire(value),
            None => default_wire(field, source.enum_type(field).as_deref()),
        },
    }
}
