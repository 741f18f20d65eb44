//! The codec driven through a hand-written `Message` implementation

use pblite_codec::{
    decode, decode_with, encode, DecodeOptions, DiagnosticLog, EnumDescriptor, FieldDescriptor,
    FieldKind, Message, MessageSchema, ScalarValue, Severity,
};
use serde_json::json;
use std::sync::Arc;

/// Contact with typed storage and fixed field numbers.
#[derive(Debug, Default, Clone, PartialEq)]
struct Contact {
    name: Option<ScalarValue>,
    tags: Vec<ScalarValue>,
    friend: Option<Box<Contact>>,
    groups: Vec<Contact>,
    kind: Option<ScalarValue>,
}

fn contact_schema() -> &'static Arc<MessageSchema> {
    static SCHEMA: std::sync::OnceLock<Arc<MessageSchema>> = std::sync::OnceLock::new();
    SCHEMA.get_or_init(|| {
        Arc::new(
            MessageSchema::new(
                "Contact",
                vec![
                    FieldDescriptor::new(1, "name", FieldKind::String),
                    FieldDescriptor::new(2, "tags", FieldKind::String).repeated(),
                    FieldDescriptor::message(3, "friend", "Contact"),
                    FieldDescriptor::message(4, "groups", "Contact").repeated(),
                    FieldDescriptor::enumeration(6, "kind", "Kind"),
                ],
            )
            .expect("valid schema"),
        )
    })
}

fn kind_enum() -> Arc<EnumDescriptor> {
    Arc::new(EnumDescriptor::new("Kind", [("PERSON", 1), ("BOT", 2)]))
}

impl Message for Contact {
    fn schema(&self) -> &Arc<MessageSchema> {
        contact_schema()
    }

    fn enum_type(&self, field: &FieldDescriptor) -> Option<Arc<EnumDescriptor>> {
        (field.number == 6).then(kind_enum)
    }

    fn get(&self, field: &FieldDescriptor) -> Option<&ScalarValue> {
        match field.number {
            1 => self.name.as_ref(),
            6 => self.kind.as_ref(),
            _ => None,
        }
    }

    fn set(&mut self, field: &FieldDescriptor, value: ScalarValue) {
        match field.number {
            1 => self.name = Some(value),
            6 => self.kind = Some(value),
            _ => {}
        }
    }

    fn clear(&mut self, field: &FieldDescriptor) {
        match field.number {
            1 => self.name = None,
            2 => self.tags.clear(),
            3 => self.friend = None,
            4 => self.groups.clear(),
            6 => self.kind = None,
            _ => {}
        }
    }

    fn repeated(&self, field: &FieldDescriptor) -> &[ScalarValue] {
        match field.number {
            2 => &self.tags,
            _ => &[],
        }
    }

    fn extend_repeated(&mut self, field: &FieldDescriptor, values: Vec<ScalarValue>) {
        if field.number == 2 {
            self.tags.extend(values);
        }
    }

    fn message(&self, field: &FieldDescriptor) -> Option<&dyn Message> {
        match field.number {
            3 => self.friend.as_deref().map(|c| c as &dyn Message),
            _ => None,
        }
    }

    fn message_mut(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Message> {
        match field.number {
            3 => {
                let friend = self.friend.get_or_insert_with(Box::default);
                Some(friend.as_mut() as &mut dyn Message)
            }
            _ => None,
        }
    }

    fn message_count(&self, field: &FieldDescriptor) -> usize {
        match field.number {
            4 => self.groups.len(),
            _ => 0,
        }
    }

    fn message_at(&self, field: &FieldDescriptor, index: usize) -> Option<&dyn Message> {
        match field.number {
            4 => self.groups.get(index).map(|c| c as &dyn Message),
            _ => None,
        }
    }

    fn add_message(&mut self, field: &FieldDescriptor) -> Option<&mut dyn Message> {
        match field.number {
            4 => {
                self.groups.push(Contact::default());
                self.groups.last_mut().map(|c| c as &mut dyn Message)
            }
            _ => None,
        }
    }
}

#[test]
fn adapter_decodes_every_field_kind() {
    let mut contact = Contact::default();
    decode(
        &mut contact,
        &json!(["ann", ["a", "b"], ["bob"], [["g1"], ["g2", ["x"]]], null, 2]),
        false,
    );

    assert_eq!(contact.name, Some(ScalarValue::from("ann")));
    assert_eq!(contact.tags, vec![ScalarValue::from("a"), ScalarValue::from("b")]);
    assert_eq!(
        contact.friend.as_ref().and_then(|f| f.name.clone()),
        Some(ScalarValue::from("bob"))
    );
    assert_eq!(contact.groups.len(), 2);
    assert_eq!(contact.groups[1].tags, vec![ScalarValue::from("x")]);
    assert_eq!(contact.kind, Some(ScalarValue::Enum(2)));
}

#[test]
fn adapter_encode_round_trips() {
    let mut contact = Contact {
        name: Some("ann".into()),
        tags: vec!["t".into()],
        kind: Some(ScalarValue::Enum(1)),
        ..Contact::default()
    };
    contact.groups.push(Contact {
        name: Some("g".into()),
        ..Contact::default()
    });

    let encoded = encode(&contact);
    assert_eq!(
        encoded,
        json!(["ann", ["t"], null, [["g", [], null, [], null, 1]], null, 1])
    );

    let mut decoded = Contact::default();
    decode(&mut decoded, &encoded, false);
    assert_eq!(encode(&decoded), encoded);
}

#[test]
fn adapter_enum_membership_is_checked() {
    let mut contact = Contact::default();
    let mut log = DiagnosticLog::new();
    decode_with(
        &mut contact,
        &json!([null, null, null, null, null, 9]),
        DecodeOptions::default(),
        &mut log,
    );

    assert_eq!(contact.kind, None);
    assert_eq!(log.count(Severity::Warning), 1);
}

#[test]
fn adapter_repeated_message_elements_are_created_per_item() {
    let mut contact = Contact::default();
    let mut log = DiagnosticLog::new();
    decode_with(
        &mut contact,
        &json!([null, null, null, [["ok"], "bad"]]),
        DecodeOptions::default(),
        &mut log,
    );

    // The malformed element still gets a slot, left empty.
    assert_eq!(contact.groups.len(), 2);
    assert_eq!(contact.groups[1], Contact::default());
    assert_eq!(log.count(Severity::Warning), 1);
}
