//! pblite Format - Core primitives for the pblite positional array encoding
//!
//! pblite represents a protobuf-style message as a JSON array whose element at
//! 1-based position *i* carries field number *i*. This crate provides the
//! building blocks shared by the codec and the tooling, with no codec logic:
//!
//! - Field kind and label taxonomy
//! - Schema descriptors and the schema registry (with TOML/JSON loading)
//! - Wire helpers (sentinel skipping, overflow maps, triviality checks)
//! - Constants
//! - Error types

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod schema;
pub mod types;
pub mod wire;

// Re-export commonly used types
pub use error::{PbliteError, Result, SchemaError};
pub use schema::{EnumDescriptor, EnumValue, FieldDescriptor, MessageSchema, SchemaRegistry};
pub use types::{FieldKind, Label, NumericKind};
pub use wire::{FieldEntry, MessageView};

/// Re-exported so downstream crates name the wire value type consistently.
pub use serde_json::{Map, Value};
