//! Permissive pblite decoder
//!
//! Decoding merges a pblite array into an existing message in place. It never
//! fails: every problem is reported to the [`Observer`] and scoped as tightly
//! as possible.
//!
//! - A value that is not an array leaves the target untouched.
//! - A nested array carrying no fields does not create the sub-message.
//! - A bad singular field keeps its prior value.
//! - A bad element in a repeated scalar field clears the field, including
//!   elements present before the call.
//! - Unknown field numbers are skipped, reported at debug level when the value
//!   carries data.

use crate::coerce::scalar_from_wire;
use crate::diagnostics::{Diagnostic, DiagnosticCause, FieldRef, Observer, Severity, TracingObserver};
use crate::message::Message;
use pblite_format::wire::{is_trivial, json_type_name};
use pblite_format::{FieldDescriptor, FieldEntry, FieldKind, MessageView, PbliteError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Decoding options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Skip element 0 of the outermost array (a message-type tag sentinel),
    /// so element 1 carries field 1. Nested messages are never shifted.
    pub ignore_first_item: bool,
}

impl DecodeOptions {
    /// Options with the sentinel skip enabled.
    pub fn with_sentinel() -> Self {
        Self {
            ignore_first_item: true,
        }
    }
}

/// Decode `pblite` into `target`, reporting problems through `tracing`.
pub fn decode(target: &mut dyn Message, pblite: &Value, ignore_first_item: bool) {
    decode_with(
        target,
        pblite,
        DecodeOptions { ignore_first_item },
        &mut TracingObserver,
    );
}

/// Decode `pblite` into `target`, reporting problems to `observer`.
pub fn decode_with(
    target: &mut dyn Message,
    pblite: &Value,
    opts: DecodeOptions,
    observer: &mut dyn Observer,
) {
    Decoder { observer }.message(target, pblite, opts.ignore_first_item);
}

struct Decoder<'o> {
    observer: &'o mut dyn Observer,
}

impl Decoder<'_> {
    fn message(&mut self, target: &mut dyn Message, pblite: &Value, ignore_first_item: bool) {
        let schema = Arc::clone(target.schema());

        let view = match MessageView::parse(pblite, ignore_first_item) {
            Ok(view) => view,
            Err(_) => {
                self.emit(
                    Severity::Warning,
                    schema.name(),
                    None,
                    DiagnosticCause::NotAnArray {
                        found: json_type_name(pblite),
                    },
                );
                return;
            }
        };

        for entry in view.entries() {
            let (number, value) = match entry {
                FieldEntry::Field { number, value } => (number, value),
                FieldEntry::InvalidKey { key, .. } => {
                    self.emit(
                        Severity::Warning,
                        schema.name(),
                        None,
                        DiagnosticCause::InvalidFieldNumber {
                            key: key.to_string(),
                        },
                    );
                    continue;
                }
            };

            let Some(field) = schema.field_by_number(number) else {
                if !is_trivial(value) {
                    self.emit(
                        Severity::Debug,
                        schema.name(),
                        Some(FieldRef {
                            number,
                            name: None,
                            repeated: false,
                        }),
                        DiagnosticCause::UnknownField {
                            value: value.clone(),
                        },
                    );
                }
                continue;
            };

            let outcome = if field.is_repeated() {
                self.repeated_field(target, field, value)
            } else {
                self.singular_field(target, field, value)
            };

            if let Err(err) = outcome {
                self.field_warning(schema.name(), field, err);
            }
        }
    }

    fn singular_field(
        &mut self,
        target: &mut dyn Message,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<()> {
        match field.kind {
            FieldKind::Message => {
                // Checked here so a bad value never materialises the sub-message.
                if !value.is_array() {
                    return Err(PbliteError::NotAnArray(json_type_name(value)));
                }
                // An array with no fields leaves an absent sub-message absent.
                if target.message(field).is_none()
                    && MessageView::parse(value, false)?.entries().next().is_none()
                {
                    return Ok(());
                }
                let child = target.message_mut(field).ok_or_else(|| unresolved(field))?;
                self.message(child, value, false);
            }
            _ => {
                let enum_type = target.enum_type(field);
                let scalar = scalar_from_wire(field, enum_type.as_deref(), value)?;
                target.set(field, scalar);
            }
        }
        Ok(())
    }

    fn repeated_field(
        &mut self,
        target: &mut dyn Message,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<()> {
        let items = value
            .as_array()
            .ok_or_else(|| PbliteError::NotAnArray(json_type_name(value)))?;

        match field.kind {
            FieldKind::Message => {
                for item in items {
                    let child = target.add_message(field).ok_or_else(|| unresolved(field))?;
                    self.message(child, item, false);
                }
            }
            _ => {
                // A failing element empties the whole field, earlier decodes included.
                let enum_type = target.enum_type(field);
                let values = items
                    .iter()
                    .map(|item| scalar_from_wire(field, enum_type.as_deref(), item))
                    .collect::<Result<Vec<_>>>();
                match values {
                    Ok(values) => target.extend_repeated(field, values),
                    Err(err) => {
                        target.clear(field);
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    fn field_warning(&mut self, message_type: &str, field: &FieldDescriptor, err: PbliteError) {
        self.emit(
            Severity::Warning,
            message_type,
            Some(FieldRef {
                number: field.number,
                name: Some(field.name.clone()),
                repeated: field.is_repeated(),
            }),
            DiagnosticCause::FieldValue(err),
        );
    }

    fn emit(
        &mut self,
        severity: Severity,
        message_type: &str,
        field: Option<FieldRef>,
        cause: DiagnosticCause,
    ) {
        self.observer.observe(Diagnostic {
            severity,
            message_type: message_type.to_string(),
            field,
            cause,
        });
    }
}

fn unresolved(field: &FieldDescriptor) -> PbliteError {
    PbliteError::UnknownMessageType(field.type_name.clone().unwrap_or_default())
}
