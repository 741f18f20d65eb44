#![no_main]

use libfuzzer_sys::fuzz_target;
use pblite_codec::{decode_with, encode, DecodeOptions, Diagnostic, DynamicMessage, SchemaRegistry};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

const SCHEMA: &str = r#"
[[message]]
name = "Node"
field = [
    { number = 1, name = "name", kind = "string" },
    { number = 2, name = "next", kind = "message", type = "Node" },
    { number = 3, name = "children", kind = "message", type = "Node", label = "repeated" },
    { number = 4, name = "blob", kind = "bytes", label = "repeated" },
    { number = 5, name = "count", kind = "uint64" },
    { number = 6, name = "ratio", kind = "float" },
    { number = 7, name = "state", kind = "enum", type = "State" },
    { number = 9, name = "flag", kind = "bool" },
]

[[enum]]
name = "State"
value = [{ name = "IDLE", number = 0 }, { name = "BUSY", number = 3 }]
"#;

fn registry() -> Arc<SchemaRegistry> {
    static REGISTRY: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();
    Arc::clone(REGISTRY.get_or_init(|| Arc::new(SchemaRegistry::from_toml_str(SCHEMA).unwrap())))
}

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let ignore_first_item = data.first().is_some_and(|b| b & 1 == 1);

    let mut target = DynamicMessage::new(registry(), "Node").unwrap();
    decode_with(
        &mut target,
        &value,
        DecodeOptions { ignore_first_item },
        &mut |_: Diagnostic| {},
    );

    // Whatever decoded must re-encode to a fixed point.
    let encoded = encode(&target);
    let mut again = DynamicMessage::new(registry(), "Node").unwrap();
    decode_with(&mut again, &encoded, DecodeOptions::default(), &mut |_: Diagnostic| {});
    assert_eq!(encode(&again), encoded);
});
