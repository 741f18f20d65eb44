//! Schema descriptors and the registry that resolves type references
//!
//! A [`SchemaRegistry`] owns every message and enum type by fully qualified
//! name. Message fields point at other types by name, so self-referential and
//! mutually recursive schemas need no special handling.
//!
//! Registries are built in code through [`SchemaRegistry::builder`] or loaded
//! from a TOML/JSON schema file:
//!
//! ```toml
//! [[message]]
//! name = "chat.User"
//!
//! [[message.field]]
//! number = 1
//! name = "id"
//! kind = "string"
//!
//! [[message.field]]
//! number = 2
//! name = "roles"
//! kind = "enum"
//! type = "chat.Role"
//! label = "repeated"
//!
//! [[enum]]
//! name = "chat.Role"
//! value = [{ name = "MEMBER", number = 0 }, { name = "OWNER", number = 1 }]
//! ```

use crate::constants::{MAX_FIELD_NUMBER, MIN_FIELD_NUMBER};
use crate::error::SchemaError;
use crate::types::{FieldKind, Label};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Schema metadata for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field number; also the 1-based array position on the wire
    pub number: u32,
    /// Field name used to address the slot on a message instance
    pub name: String,
    /// Value shape
    pub kind: FieldKind,
    /// Singular or repeated
    #[serde(default)]
    pub label: Label,
    /// Referenced message or enum type (kinds `message` and `enum` only)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Declared default for singular scalars, in wire form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// Singular field of a scalar kind.
    pub fn new(number: u32, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            number,
            name: name.into(),
            kind,
            label: Label::Singular,
            type_name: None,
            default: None,
        }
    }

    /// Singular nested message field.
    pub fn message(number: u32, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::new(number, name, FieldKind::Message)
        }
    }

    /// Singular enum field.
    pub fn enumeration(number: u32, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::new(number, name, FieldKind::Enum)
        }
    }

    /// Mark the field repeated.
    pub fn repeated(mut self) -> Self {
        self.label = Label::Repeated;
        self
    }

    /// Attach a declared default (wire form).
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether the field holds a sequence.
    pub fn is_repeated(&self) -> bool {
        self.label.is_repeated()
    }

    fn validate(&self, message: &str) -> Result<(), SchemaError> {
        if !(MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER).contains(&self.number) {
            return Err(SchemaError::InvalidFieldNumber {
                message: message.to_string(),
                field: self.name.clone(),
                number: self.number,
            });
        }

        match (self.kind.needs_type_name(), &self.type_name) {
            (true, None) => {
                return Err(SchemaError::MissingTypeName {
                    message: message.to_string(),
                    field: self.name.clone(),
                    kind: self.kind.name(),
                })
            }
            (false, Some(_)) => {
                return Err(SchemaError::UnexpectedTypeName {
                    message: message.to_string(),
                    field: self.name.clone(),
                })
            }
            _ => {}
        }

        if let Some(default) = &self.default {
            let scalar = matches!(default, Value::Bool(_) | Value::Number(_) | Value::String(_));
            if self.is_repeated() || self.kind == FieldKind::Message || !scalar {
                return Err(SchemaError::InvalidDefault {
                    message: message.to_string(),
                    field: self.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Schema for one message type: its fields ordered by number.
#[derive(Debug, Clone)]
pub struct MessageSchema {
    name: String,
    fields: Vec<FieldDescriptor>,
    by_number: AHashMap<u32, usize>,
    by_name: AHashMap<String, usize>,
}

impl MessageSchema {
    /// Build a schema, checking field numbers and names.
    ///
    /// Type references are resolved later, by [`SchemaRegistryBuilder::build`].
    pub fn new(
        name: impl Into<String>,
        mut fields: Vec<FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        for field in &fields {
            field.validate(&name)?;
        }

        fields.sort_by_key(|field| field.number);

        let mut by_number = AHashMap::with_capacity(fields.len());
        let mut by_name = AHashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            if by_number.insert(field.number, idx).is_some() {
                return Err(SchemaError::DuplicateFieldNumber {
                    message: name,
                    number: field.number,
                });
            }
            if by_name.insert(field.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateFieldName {
                    message: name,
                    name: field.name.clone(),
                });
            }
        }

        Ok(Self {
            name,
            fields,
            by_number,
            by_name,
        })
    }

    /// Fully qualified message type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in ascending field-number order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by number.
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.by_number.get(&number).map(|&idx| &self.fields[idx])
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&idx| &self.fields[idx])
    }

    /// Highest declared field number, `0` for a message without fields.
    pub fn max_field_number(&self) -> u32 {
        self.fields.last().map_or(0, |field| field.number)
    }
}

/// One named enum value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Symbolic name
    pub name: String,
    /// Wire number
    pub number: i32,
}

/// Closed set of enum values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Fully qualified enum type name
    pub name: String,
    /// Declared values; the first one is the default
    #[serde(rename = "value", alias = "values")]
    pub values: Vec<EnumValue>,
}

impl EnumDescriptor {
    /// Build an enum from `(name, number)` pairs.
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values
                .into_iter()
                .map(|(name, number)| EnumValue {
                    name: name.into(),
                    number,
                })
                .collect(),
        }
    }

    /// Whether `number` is a declared value.
    pub fn contains(&self, number: i32) -> bool {
        self.values.iter().any(|value| value.number == number)
    }

    /// Number of the first declared value.
    pub fn default_number(&self) -> i32 {
        self.values.first().map_or(0, |value| value.number)
    }

    /// Symbolic name of `number`.
    pub fn name_of(&self, number: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|value| value.number == number)
            .map(|value| value.name.as_str())
    }

    /// Number of the value called `name`.
    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|value| value.name == name)
            .map(|value| value.number)
    }
}

/// All message and enum types known to a codec session.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    messages: AHashMap<String, Arc<MessageSchema>>,
    enums: AHashMap<String, Arc<EnumDescriptor>>,
    finite_defaults: AHashSet<String>,
}

impl SchemaRegistry {
    /// Start assembling a registry in code.
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Load a registry from a TOML schema file.
    pub fn from_toml_str(source: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile = toml::from_str(source)?;
        file.into_registry()
    }

    /// Load a registry from a JSON schema file with the same layout as TOML.
    pub fn from_json_str(source: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile = serde_json::from_str(source)?;
        file.into_registry()
    }

    /// Look up a message type.
    pub fn message(&self, name: &str) -> Option<&Arc<MessageSchema>> {
        self.messages.get(name)
    }

    /// Look up an enum type.
    pub fn enumeration(&self, name: &str) -> Option<&Arc<EnumDescriptor>> {
        self.enums.get(name)
    }

    /// Schema of the message type a `message` field points at.
    pub fn nested_schema(&self, field: &FieldDescriptor) -> Option<&Arc<MessageSchema>> {
        match field.kind {
            FieldKind::Message => field.type_name.as_deref().and_then(|name| self.message(name)),
            _ => None,
        }
    }

    /// Enum type an `enum` field points at.
    pub fn enum_for(&self, field: &FieldDescriptor) -> Option<&Arc<EnumDescriptor>> {
        match field.kind {
            FieldKind::Enum => field
                .type_name
                .as_deref()
                .and_then(|name| self.enumeration(name)),
            _ => None,
        }
    }

    /// Whether the all-defaults instance of `name` is finite, i.e. no chain of
    /// singular message fields leads from it back into a cycle. Only such
    /// types can be written out in full when a sub-message is unset.
    pub fn has_finite_default(&self, name: &str) -> bool {
        self.finite_defaults.contains(name)
    }

    /// Message type names, sorted.
    pub fn message_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.messages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Collects types, then resolves every type reference in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    messages: Vec<MessageSchema>,
    enums: Vec<EnumDescriptor>,
}

impl SchemaRegistryBuilder {
    /// Add a message type.
    pub fn message(mut self, schema: MessageSchema) -> Self {
        self.messages.push(schema);
        self
    }

    /// Add an enum type.
    pub fn enumeration(mut self, descriptor: EnumDescriptor) -> Self {
        self.enums.push(descriptor);
        self
    }

    /// Finish the registry.
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let mut registry = SchemaRegistry::default();

        for descriptor in self.enums {
            if descriptor.values.is_empty() {
                return Err(SchemaError::EmptyEnum(descriptor.name));
            }
            let name = descriptor.name.clone();
            if registry.enums.insert(name.clone(), Arc::new(descriptor)).is_some() {
                return Err(SchemaError::DuplicateType(name));
            }
        }

        for schema in self.messages {
            let name = schema.name().to_string();
            if registry.enums.contains_key(&name)
                || registry
                    .messages
                    .insert(name.clone(), Arc::new(schema))
                    .is_some()
            {
                return Err(SchemaError::DuplicateType(name));
            }
        }

        for schema in registry.messages.values() {
            for field in schema.fields() {
                let resolved = match field.kind {
                    FieldKind::Message => registry.nested_schema(field).is_some(),
                    FieldKind::Enum => registry.enum_for(field).is_some(),
                    _ => true,
                };
                if !resolved {
                    return Err(SchemaError::UnknownType {
                        message: schema.name().to_string(),
                        field: field.name.clone(),
                        type_name: field.type_name.clone().unwrap_or_default(),
                    });
                }
            }
        }

        registry.finite_defaults = finite_defaults(&registry.messages);
        Ok(registry)
    }
}

fn finite_defaults(messages: &AHashMap<String, Arc<MessageSchema>>) -> AHashSet<String> {
    let mut known = AHashMap::new();
    for name in messages.keys() {
        visit_defaults(name, messages, &mut Vec::new(), &mut known);
    }
    known
        .into_iter()
        .filter(|(_, finite)| *finite)
        .map(|(name, _)| name.to_string())
        .collect()
}

// Repeated fields default to `[]`, so only singular message edges count.
fn visit_defaults<'a>(
    name: &'a str,
    messages: &'a AHashMap<String, Arc<MessageSchema>>,
    path: &mut Vec<&'a str>,
    known: &mut AHashMap<&'a str, bool>,
) -> bool {
    if let Some(&finite) = known.get(name) {
        return finite;
    }
    if path.contains(&name) {
        return false;
    }
    let Some(schema) = messages.get(name) else {
        return false;
    };

    path.push(name);
    let finite = schema
        .fields()
        .iter()
        .filter(|field| matches!(field.kind, FieldKind::Message) && !field.is_repeated())
        .all(|field| {
            field
                .type_name
                .as_deref()
                .is_some_and(|child| visit_defaults(child, messages, path, known))
        });
    path.pop();

    known.insert(name, finite);
    finite
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    #[serde(default, rename = "message")]
    messages: Vec<MessageDefinition>,
    #[serde(default, rename = "enum")]
    enums: Vec<EnumDescriptor>,
}

#[derive(Debug, Deserialize)]
struct MessageDefinition {
    name: String,
    #[serde(default, rename = "field", alias = "fields")]
    fields: Vec<FieldDescriptor>,
}

impl SchemaFile {
    fn into_registry(self) -> Result<SchemaRegistry, SchemaError> {
        let mut builder = SchemaRegistry::builder();
        for definition in self.messages {
            builder = builder.message(MessageSchema::new(definition.name, definition.fields)?);
        }
        for descriptor in self.enums {
            builder = builder.enumeration(descriptor);
        }
        builder.build()
    }
}
