//! Reflection-style message backed by a schema registry

use crate::coerce::{scalar_from_named, scalar_to_wire};
use crate::message::Message;
use crate::value::ScalarValue;
use pblite_format::{
    EnumDescriptor, FieldDescriptor, FieldKind, MessageSchema, PbliteError, Result, SchemaRegistry,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Scalar(ScalarValue),
    Scalars(Vec<ScalarValue>),
    Message(Box<DynamicMessage>),
    Messages(Vec<DynamicMessage>),
}

/// A message whose layout is looked up at runtime from a [`SchemaRegistry`].
///
/// Slots are keyed by field number; unset fields have no slot. Nested
/// messages share the registry, so recursive types nest as deep as the data.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    registry: Arc<SchemaRegistry>,
    schema: Arc<MessageSchema>,
    slots: BTreeMap<u32, Slot>,
}

impl DynamicMessage {
    /// Empty message of the named type.
    pub fn new(registry: Arc<SchemaRegistry>, type_name: &str) -> Result<Self> {
        let schema = registry
            .message(type_name)
            .cloned()
            .ok_or_else(|| PbliteError::UnknownMessageType(type_name.to_string()))?;
        Ok(Self::with_schema(registry, schema))
    }

    /// Empty message with an already resolved schema.
    pub fn with_schema(registry: Arc<SchemaRegistry>, schema: Arc<MessageSchema>) -> Self {
        Self {
            registry,
            schema,
            slots: BTreeMap::new(),
        }
    }

    /// Registry this message resolves nested types against.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Whether the field has a value (a non-empty sequence for repeated fields).
    pub fn has(&self, field: &FieldDescriptor) -> bool {
        match self.slots.get(&field.number) {
            Some(Slot::Scalars(values)) => !values.is_empty(),
            Some(Slot::Messages(values)) => !values.is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.schema.fields().iter().all(|field| !self.has(field))
    }

    /// Field descriptor by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.schema.field_by_name(name)
    }

    /// Singular scalar by field name.
    pub fn get_by_name(&self, name: &str) -> Option<&ScalarValue> {
        let field = self.field(name)?;
        self.get(field)
    }

    /// Set a singular scalar by field name.
    pub fn set_by_name(&mut self, name: &str, value: impl Into<ScalarValue>) -> Result<()> {
        let field = self.require_field(name)?;
        self.set(&field, value.into());
        Ok(())
    }

    /// Append to a repeated scalar by field name.
    pub fn push_by_name(&mut self, name: &str, value: impl Into<ScalarValue>) -> Result<()> {
        let field = self.require_field(name)?;
        self.extend_repeated(&field, vec![value.into()]);
        Ok(())
    }

    /// Repeated scalar elements by field name.
    pub fn repeated_by_name(&self, name: &str) -> &[ScalarValue] {
        match self.field(name) {
            Some(field) => self.repeated(field),
            None => &[],
        }
    }

    /// Nested message by field name, created if unset.
    pub fn message_by_name_mut(&mut self, name: &str) -> Result<&mut DynamicMessage> {
        let field = self.require_field(name)?;
        self.child_mut(&field)
    }

    /// Append a nested message by field name.
    pub fn add_message_by_name(&mut self, name: &str) -> Result<&mut DynamicMessage> {
        let field = self.require_field(name)?;
        self.push_child(&field)
    }

    /// Nested message by field name.
    pub fn message_by_name(&self, name: &str) -> Option<&DynamicMessage> {
        match self.slots.get(&self.field(name)?.number) {
            Some(Slot::Message(child)) => Some(&**child),
            _ => None,
        }
    }

    /// Repeated nested messages by field name.
    pub fn messages_by_name(&self, name: &str) -> &[DynamicMessage] {
        let number = match self.field(name) {
            Some(field) => field.number,
            None => return &[],
        };
        match self.slots.get(&number) {
            Some(Slot::Messages(children)) => children,
            _ => &[],
        }
    }

    /// Object view keyed by field name, holding only set fields. Enum values
    /// use their symbolic name when declared; bytes are base64.
    pub fn to_named_json(&self) -> Value {
        let mut object = Map::new();
        for field in self.schema.fields() {
            let Some(slot) = self.slots.get(&field.number) else {
                continue;
            };
            let enum_type = self.enum_type(field);
            let named = |value: &ScalarValue| named_scalar(value, enum_type.as_deref());
            let value = match slot {
                Slot::Scalar(value) => named(value),
                Slot::Scalars(values) => Value::Array(values.iter().map(named).collect()),
                Slot::Message(child) => child.to_named_json(),
                Slot::Messages(children) => {
                    Value::Array(children.iter().map(DynamicMessage::to_named_json).collect())
                }
            };
            object.insert(field.name.clone(), value);
        }
        Value::Object(object)
    }

    /// Merge an object keyed by field name into this message.
    ///
    /// Unlike pblite decoding this is strict: the first problem is returned
    /// and the message may be partially updated.
    pub fn merge_named_json(&mut self, value: &Value) -> Result<()> {
        let object = value.as_object().ok_or(PbliteError::TypeMismatch {
            expected: "object",
            found: pblite_format::wire::json_type_name(value),
        })?;

        for (name, value) in object {
            let field = self.require_field(name)?;
            if value.is_null() {
                self.clear(&field);
                continue;
            }

            match (field.kind, field.is_repeated()) {
                (FieldKind::Message, false) => self.child_mut(&field)?.merge_named_json(value)?,
                (FieldKind::Message, true) => {
                    for item in expect_array(value)? {
                        self.push_child(&field)?.merge_named_json(item)?;
                    }
                }
                (_, false) => {
                    let scalar = scalar_from_named(&field, self.enum_type(&field).as_deref(), value)?;
                    self.set(&field, scalar);
                }
                (_, true) => {
                    let enum_type = self.enum_type(&field);
                    let values = expect_array(value)?
                        .iter()
                        .map(|item| scalar_from_named(&field, enum_type.as_deref(), item))
                        .collect::<Result<Vec<_>>>()?;
                    self.extend_repeated(&field, values);
                }
            }
        }
        Ok(())
    }

    fn require_field(&self, name: &str) -> Result<FieldDescriptor> {
        self.field(name)
            .cloned()
            .ok_or_else(|| PbliteError::UnknownFieldName {
                message: self.schema.name().to_string(),
                name: name.to_string(),
            })
    }

    fn nested_schema(&self, field: &FieldDescriptor) -> Result<Arc<MessageSchema>> {
        self.registry
            .nested_schema(field)
            .cloned()
            .ok_or_else(|| unresolved(field))
    }

    fn child_mut(&mut self, field: &FieldDescriptor) -> Result<&mut DynamicMessage> {
        if !matches!(self.slots.get(&field.number), Some(Slot::Message(_))) {
            let child = DynamicMessage::with_schema(Arc::clone(&self.registry), self.nested_schema(field)?);
            self.slots.insert(field.number, Slot::Message(Box::new(child)));
        }
        match self.slots.get_mut(&field.number) {
            Some(Slot::Message(child)) => Ok(child.as_mut()),
            _ => Err(unresolved(field)),
        }
    }

    fn push_child(&mut self, field: &FieldDescriptor) -> Result<&mut DynamicMessage> {
        let child = DynamicMessage::with_schema(Arc::clone(&self.registry), self.nested_schema(field)?);
        match self.slots.get_mut(&field.number) {
            Some(Slot::Messages(children)) => children.push(child),
            _ => {
                self.slots.insert(field.number, Slot::Messages(vec![child]));
            }
        }
        match self.slots.get_mut(&field.number) {
            Some(Slot::Messages(children)) => children.last_mut().ok_or_else(|| unresolved(field)),
            _ => Err(unresolved(field)),
        }
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.slots == other.slots
    }
}

impl Message for DynamicMessage {
    fn schema(&self) -> &Arc<MessageSchema> {
        &self.schema
    }

    fn enum_type(&self, field: &FieldDescriptor) -> Option<Arc<EnumDescriptor>> {
        self.registry.enum_for(field).cloned()
    }

    fn get(&self, field: &FieldDescriptor) -> Option<&ScalarValue> {
        match self.slots.get(&field.number) {
            Some(Slot::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    fn set(&mut self, field: &FieldDescriptor, value: ScalarValue) {
        self.slots.insert(field.number, Slot::Scalar(value));
    }

    fn clear(&mut self, field: &FieldDescriptor) {
        self.slots.remove(&field.number);
    }

    fn repeated(&self, field: &FieldDescriptor) -> &[ScalarValue] {
        match self.slots.get(&field.number) {
            Some(Slot::Scalars(values)) => values,
            _ => &[],
        }
    }

    fn extend_repeated(&mut self, field: &FieldDescriptor, values: Vec<ScalarValue>) {
        match self.slots.get_mut(&field.number) {
            Some(Slot::Scalars(existing)) => existing.extend(values),
            _ => {
                self.slots.insert(field.number, Slot::Scalars(values));
            }
        }
    }

    fn message(&self, field: &FieldDescriptor) -> Option<&dyn Message> {
        match self.slots.get(&field.number) {
            Some(Slot::Message(child)) => Some(&**child),
            _ => None,
        }
    }

    fn message_mut(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Message> {
        self.child_mut(field).ok().map(|child| child as &mut dyn Message)
    }

    fn message_count(&self, field: &FieldDescriptor) -> usize {
        match self.slots.get(&field.number) {
            Some(Slot::Messages(children)) => children.len(),
            _ => 0,
        }
    }

    fn message_at(&self, field: &FieldDescriptor, index: usize) -> Option<&dyn Message> {
        match self.slots.get(&field.number) {
            Some(Slot::Messages(children)) => children.get(index).map(|c| c as &dyn Message),
            _ => None,
        }
    }

    fn add_message(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Message> {
        self.push_child(field).ok().map(|child| child as &mut dyn Message)
    }

    fn default_message(&self, field: &FieldDescriptor) -> Option<Box<dyn Message>> {
        let schema = self.registry.nested_schema(field)?;
        if !self.registry.has_finite_default(schema.name()) {
            return None;
        }
        Some(Box::new(DynamicMessage::with_schema(
            Arc::clone(&self.registry),
            Arc::clone(schema),
        )))
    }
}

fn named_scalar(value: &ScalarValue, enum_type: Option<&EnumDescriptor>) -> Value {
    match (value, enum_type) {
        (ScalarValue::Enum(number), Some(descriptor)) => descriptor
            .name_of(*number)
            .map_or_else(|| Value::from(*number), |name| Value::String(name.to_string())),
        _ => scalar_to_wire(value),
    }
}

fn unresolved(field: &FieldDescriptor) -> PbliteError {
    PbliteError::UnknownMessageType(field.type_name.clone().unwrap_or_default())
}

fn expect_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or(PbliteError::NotAnArray(
        pblite_format::wire::json_type_name(value),
    ))
}
