//! pblite Codec - Decoder and encoder between messages and pblite arrays
//!
//! This crate provides the conversion engines on top of `pblite-format`:
//!
//! - The [`Message`] seam a decoder writes through and an encoder reads from
//! - [`DynamicMessage`], a schema-driven implementation of that seam
//! - A permissive decoder that merges pblite arrays into messages in place
//! - A deterministic encoder producing positional pblite arrays
//! - Decode diagnostics routed to an [`Observer`]
//!
//! ```
//! use pblite_codec::{decode, encode, DynamicMessage, SchemaRegistry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(SchemaRegistry::from_toml_str(r#"
//!     [[message]]
//!     name = "User"
//!     field = [
//!         { number = 1, name = "id", kind = "int64" },
//!         { number = 2, name = "name", kind = "string" },
//!     ]
//! "#).unwrap());
//!
//! let mut user = DynamicMessage::new(registry, "User").unwrap();
//! decode(&mut user, &json!([42, "ada"]), false);
//! assert_eq!(encode(&user), json!([42, "ada"]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod coerce;
pub mod decode;
pub mod diagnostics;
pub mod dynamic;
pub mod encode;
pub mod message;
pub mod value;

// Re-export commonly used types
pub use pblite_format::{
    EnumDescriptor, FieldDescriptor, FieldKind, Label, MessageSchema, NumericKind, PbliteError,
    Result, SchemaError, SchemaRegistry,
};

// Re-export our own types
pub use decode::{decode, decode_with, DecodeOptions};
pub use diagnostics::{
    Diagnostic, DiagnosticCause, DiagnosticLog, FieldRef, Observer, Severity, TracingObserver,
};
pub use dynamic::DynamicMessage;
pub use encode::{encode, encode_with, EncodeOptions};
pub use message::Message;
pub use value::ScalarValue;
