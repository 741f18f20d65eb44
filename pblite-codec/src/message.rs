//! Capability interface the codec uses to read and mutate messages
//!
//! The codec never constructs or owns a top-level message. It walks the
//! fields of [`Message::schema`] and reads or writes typed slots through this
//! trait, so any storage strategy works: the reflection-style
//! [`DynamicMessage`](crate::DynamicMessage), a hand-written adapter per type,
//! or generated accessors.

use crate::value::ScalarValue;
use pblite_format::{EnumDescriptor, FieldDescriptor, MessageSchema};
use std::sync::Arc;

/// A schema-described message instance.
///
/// Every `field` argument is a descriptor taken from [`Message::schema`] of
/// the same instance. Implementations may ignore calls whose field kind does
/// not match the operation.
pub trait Message {
    /// Schema of this message type.
    fn schema(&self) -> &Arc<MessageSchema>;

    /// Enum type of an `enum` field, if the implementation knows it.
    fn enum_type(&self, field: &FieldDescriptor) -> Option<Arc<EnumDescriptor>>;

    /// Current value of a singular scalar field, `None` if unset.
    fn get(&self, field: &FieldDescriptor) -> Option<&ScalarValue>;

    /// Assign a singular scalar field.
    fn set(&mut self, field: &FieldDescriptor, value: ScalarValue);

    /// Reset any field to empty.
    fn clear(&mut self, field: &FieldDescriptor);

    /// Elements of a repeated scalar field, in order.
    fn repeated(&self, field: &FieldDescriptor) -> &[ScalarValue];

    /// Append elements to a repeated scalar field.
    fn extend_repeated(&mut self, field: &FieldDescriptor, values: Vec<ScalarValue>);

    /// Singular nested message, `None` if unset.
    fn message(&self, field: &FieldDescriptor) -> Option<&dyn Message>;

    /// Singular nested message, created empty if unset. `None` when the
    /// nested type cannot be resolved.
    fn message_mut(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Message>;

    /// Number of elements of a repeated message field.
    fn message_count(&self, field: &FieldDescriptor) -> usize;

    /// Element `index` of a repeated message field.
    fn message_at(&self, field: &FieldDescriptor, index: usize) -> Option<&dyn Message>;

    /// Append a new empty element to a repeated message field.
    fn add_message(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Message>;

    /// Fresh all-defaults instance to encode in place of an unset singular
    /// message field. `None` encodes the field as `null`, which is the only
    /// option for types whose defaults recurse.
    fn default_message(&self, _field: &FieldDescriptor) -> Option<Box<dyn Message>> {
        None
    }
}
