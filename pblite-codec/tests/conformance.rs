//! Conformance tests for decode/encode behavior against the chat fixtures

use pblite_codec::{
    decode, decode_with, encode, encode_with, DecodeOptions, DiagnosticCause, DiagnosticLog,
    DynamicMessage, EncodeOptions, FieldDescriptor, FieldKind, MessageSchema, NumericKind,
    PbliteError, ScalarValue, SchemaRegistry, Severity,
};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../testdata")
        .join(name)
}

fn load_json(name: &str) -> Value {
    let contents = fs::read_to_string(fixture_path(name)).expect("read fixture");
    serde_json::from_str(&contents).expect("valid JSON fixture")
}

fn chat_registry() -> Arc<SchemaRegistry> {
    let contents = fs::read_to_string(fixture_path("chat.toml")).expect("read schema");
    Arc::new(SchemaRegistry::from_toml_str(&contents).expect("valid schema"))
}

fn event() -> DynamicMessage {
    DynamicMessage::new(chat_registry(), "chat.Event").expect("known type")
}

fn user() -> DynamicMessage {
    DynamicMessage::new(chat_registry(), "chat.User").expect("known type")
}

fn decode_logged(target: &mut DynamicMessage, value: &Value) -> DiagnosticLog {
    let mut log = DiagnosticLog::new();
    decode_with(target, value, DecodeOptions::default(), &mut log);
    log
}

/// Schema declaring fields 1-4 where field 3 is never set.
fn dense_registry() -> Arc<SchemaRegistry> {
    let schema = MessageSchema::new(
        "Dense",
        vec![
            FieldDescriptor::new(1, "a", FieldKind::Numeric(NumericKind::Int32)),
            FieldDescriptor::new(2, "b", FieldKind::String),
            FieldDescriptor::message(3, "c", "Dense"),
            FieldDescriptor::new(4, "d", FieldKind::Bool),
        ],
    )
    .expect("valid schema");
    Arc::new(
        SchemaRegistry::builder()
            .message(schema)
            .build()
            .expect("valid registry"),
    )
}

#[test]
fn fixture_decodes_to_expected_named_view() {
    let mut target = event();
    let log = decode_logged(&mut target, &load_json("event.pblite.json"));

    assert!(log.is_empty(), "unexpected diagnostics: {:?}", log.events());
    assert_eq!(target.to_named_json(), load_json("event.named.json"));
}

#[test]
fn fixture_round_trips_through_encode() {
    let mut first = event();
    decode(&mut first, &load_json("event.pblite.json"), false);
    let encoded = encode(&first);

    let mut second = event();
    decode(&mut second, &encoded, false);
    assert_eq!(encode(&second), encoded);
    assert_eq!(first, second);
}

#[test]
fn fixture_encodes_positionally() {
    let mut target = event();
    decode(&mut target, &load_json("event.pblite.json"), false);

    assert_eq!(
        encode(&target),
        json!([
            "evt-1",
            ["u1", "Ada", 1, null, ["aGk="], 1_623_456_789_012_345i64],
            "hello",
            null,
            [1, 2],
            null,
            null,
            [["u2", "Bob", 0, null, [], 0]],
            null,
            1.5,
            true
        ])
    );
}

#[test]
fn non_array_nested_field_is_one_warning_without_mutation() {
    let mut target = event();
    target.set_by_name("text", "before").expect("set");
    let before = target.clone();

    let log = decode_logged(&mut target, &json!([null, "x"]));

    assert_eq!(target, before);
    assert_eq!(log.events().len(), 1);
    assert_eq!(log.count(Severity::Warning), 1);
    assert!(target.message_by_name("sender").is_none());
}

#[test]
fn non_array_top_level_leaves_target_untouched() {
    for value in [json!("x"), json!(7), json!({"1": "a"}), Value::Null, json!(true)] {
        let mut target = user();
        let log = decode_logged(&mut target, &value);
        assert!(target.is_empty());
        assert_eq!(log.count(Severity::Warning), 1);
        assert!(matches!(
            log.events()[0].cause,
            DiagnosticCause::NotAnArray { .. }
        ));
    }
}

#[test]
fn null_elements_are_skipped() {
    let mut target = event();
    let log = decode_logged(&mut target, &json!([null, null, "hello"]));

    assert!(log.is_empty());
    assert!(target.get_by_name("event_id").is_none());
    assert_eq!(target.get_by_name("text"), Some(&ScalarValue::from("hello")));
}

#[test]
fn null_does_not_clear_existing_value() {
    let mut target = user();
    target.set_by_name("id", "kept").expect("set");
    decode(&mut target, &json!([null, "name"]), false);

    assert_eq!(target.get_by_name("id"), Some(&ScalarValue::from("kept")));
    assert_eq!(target.get_by_name("display_name"), Some(&ScalarValue::from("name")));
}

#[test]
fn sentinel_skip_matches_plain_decode() {
    let mut plain = user();
    decode(&mut plain, &json!(["u1", "Ada"]), false);

    let mut tagged = user();
    decode(&mut tagged, &json!(["tag", "u1", "Ada"]), true);

    assert_eq!(plain, tagged);
    assert_eq!(encode(&plain), encode(&tagged));
}

#[test]
fn overflow_map_reaches_fields_beyond_the_array() {
    let mut target = user();
    let log = decode_logged(&mut target, &json!(["u1", {"6": 99, "3": 2}]));

    assert!(log.is_empty());
    assert_eq!(target.get_by_name("id"), Some(&ScalarValue::from("u1")));
    assert_eq!(target.get_by_name("last_seen"), Some(&ScalarValue::Int(99)));
    assert_eq!(target.get_by_name("role"), Some(&ScalarValue::Enum(2)));
}

#[test]
fn overflow_map_with_sentinel() {
    let mut target = user();
    decode(&mut target, &json!(["chat.User", "u9", {"2": "Nine"}]), true);

    assert_eq!(target.get_by_name("id"), Some(&ScalarValue::from("u9")));
    assert_eq!(target.get_by_name("display_name"), Some(&ScalarValue::from("Nine")));
}

#[test]
fn repeated_bytes_are_all_or_nothing() {
    let mut target = user();
    let log = decode_logged(
        &mut target,
        &json!([null, null, null, null, ["aGk=", "not base64!", "AA=="]]),
    );

    assert!(target.repeated_by_name("avatars").is_empty());
    assert_eq!(log.count(Severity::Warning), 1);
    let event = &log.events()[0];
    assert!(matches!(
        event.cause,
        DiagnosticCause::FieldValue(PbliteError::InvalidBase64(_))
    ));
    assert!(event.to_string().contains("ignoring repeated field avatars"));
}

#[test]
fn repeated_failure_clears_elements_from_earlier_calls() {
    let mut target = event();
    decode(&mut target, &json!([null, null, null, null, [1, 2]]), false);
    assert_eq!(target.repeated_by_name("reactions").len(), 2);

    let log = decode_logged(&mut target, &json!([null, null, null, null, [3, -4]]));

    assert!(target.repeated_by_name("reactions").is_empty());
    assert_eq!(encode(&target)[4], json!([]));
    assert!(matches!(
        log.events()[0].cause,
        DiagnosticCause::FieldValue(PbliteError::NegativeUnsigned(-4))
    ));
}

#[test]
fn repeated_fields_append_across_decodes() {
    let mut target = event();
    decode(&mut target, &json!([null, null, null, null, [1]]), false);
    decode(&mut target, &json!([null, null, null, null, [2, 3]]), false);

    assert_eq!(
        target.repeated_by_name("reactions"),
        &[ScalarValue::Uint(1), ScalarValue::Uint(2), ScalarValue::Uint(3)]
    );
}

#[test]
fn bad_field_does_not_affect_siblings() {
    let mut target = user();
    let log = decode_logged(&mut target, &json!(["u1", 5, 7, null, null, "12"]));

    assert_eq!(target.get_by_name("id"), Some(&ScalarValue::from("u1")));
    assert!(target.get_by_name("display_name").is_none());
    assert!(target.get_by_name("role").is_none());
    assert_eq!(target.get_by_name("last_seen"), Some(&ScalarValue::Int(12)));
    assert_eq!(log.count(Severity::Warning), 2);
    assert!(matches!(
        log.events()[1].cause,
        DiagnosticCause::FieldValue(PbliteError::UnknownEnumValue { value: 7, .. })
    ));
}

#[test]
fn encode_pads_gaps_with_null() {
    let mut target = DynamicMessage::new(dense_registry(), "Dense").expect("known type");
    target.set_by_name("a", 1i32).expect("set");
    target.set_by_name("b", "two").expect("set");
    target.set_by_name("d", true).expect("set");

    assert_eq!(encode(&target), json!([1, "two", null, true]));
}

#[test]
fn encode_of_empty_message_uses_defaults() {
    assert_eq!(encode(&user()), json!(["", "", 0, null, [], 0]));
}

#[test]
fn unset_sender_encodes_user_defaults_but_reply_stays_null() {
    let mut target = event();
    target.set_by_name("event_id", "e1").expect("set");

    let encoded = encode(&target);
    assert_eq!(encoded[1], json!(["", "", 0, null, [], 0]));
    assert_eq!(encoded[3], Value::Null);
    assert!(target.message_by_name("sender").is_none());
}

#[test]
fn encode_with_overflow_threshold_round_trips() {
    let mut target = user();
    target.set_by_name("id", "u1").expect("set");
    target.set_by_name("last_seen", 5i64).expect("set");

    let opts = EncodeOptions {
        overflow_threshold: Some(2),
    };
    let encoded = encode_with(&target, &opts);
    assert_eq!(encoded, json!(["u1", "", {"3": 0, "5": [], "6": 5}]));

    let mut decoded = user();
    decode(&mut decoded, &encoded, false);
    assert_eq!(encode(&decoded), encode(&target));
}

#[test]
fn unknown_fields_log_only_when_non_trivial() {
    for trivial in [json!(0), json!(""), json!([]), json!(false)] {
        let mut target = user();
        let log = decode_logged(&mut target, &json!(["u1", null, null, trivial]));
        assert!(log.is_empty(), "trivial value {trivial} logged");
        assert_eq!(target.get_by_name("id"), Some(&ScalarValue::from("u1")));
    }

    let mut target = user();
    let log = decode_logged(&mut target, &json!(["u1", null, null, 42, null, 8]));
    assert_eq!(log.events().len(), 1);
    assert_eq!(log.count(Severity::Debug), 1);
    assert_eq!(
        log.events()[0].to_string(),
        "Message \"chat.User\" contains unknown field 4 with value 42"
    );
    assert_eq!(target.get_by_name("last_seen"), Some(&ScalarValue::Int(8)));
}

#[test]
fn unknown_overflow_field_is_a_debug_event() {
    let mut target = user();
    let log = decode_logged(&mut target, &json!(["u1", {"40": "x", "41": ""}]));

    assert_eq!(log.count(Severity::Debug), 1);
    assert_eq!(log.events()[0].field.as_ref().map(|f| f.number), Some(40));
}

#[test]
fn decode_is_idempotent_for_singular_fields() {
    let input = json!(["u1", "Ada", 1]);
    let mut once = user();
    decode(&mut once, &input, false);
    let mut twice = once.clone();
    decode(&mut twice, &input, false);

    assert_eq!(once, twice);
}

#[test]
fn recursive_schema_follows_data_depth() {
    let mut value = json!(["leaf"]);
    for depth in 0..64 {
        value = json!([format!("evt-{depth}"), null, null, value]);
    }

    let mut target = event();
    let log = decode_logged(&mut target, &value);
    assert!(log.is_empty());

    let encoded = encode(&target);
    let mut again = event();
    decode(&mut again, &encoded, false);
    assert_eq!(encode(&again), encoded);
}

#[test]
fn json_schema_matches_toml_schema() {
    let contents = fs::read_to_string(fixture_path("chat.json")).expect("read schema");
    let from_json = Arc::new(SchemaRegistry::from_json_str(&contents).expect("valid schema"));

    let input = json!(["u1", "Ada", 2, null, ["AA=="], "7"]);
    let mut a = DynamicMessage::new(from_json, "chat.User").expect("known type");
    let mut b = user();
    decode(&mut a, &input, false);
    decode(&mut b, &input, false);

    assert_eq!(encode(&a), encode(&b));
}
