//! Error types for the pblite format

use thiserror::Error;

/// Errors raised while interpreting pblite values.
///
/// The codec never returns these to its callers; it reports them through the
/// diagnostics channel and moves on to the next field.
#[derive(Debug, Error)]
pub enum PbliteError {
    /// A message value was something other than an array.
    #[error("expected list, got {0}")]
    NotAnArray(&'static str),
    /// An overflow map key is not a usable field number.
    #[error("invalid field number {0:?}")]
    InvalidFieldNumber(String),
    /// JSON value has the wrong shape for the field kind.
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        /// Kind the field expects.
        expected: &'static str,
        /// JSON type that was found.
        found: &'static str,
    },
    /// Integer does not fit the field's numeric kind.
    #[error("value {value} out of range for {kind}")]
    OutOfRange {
        /// Numeric kind of the field.
        kind: &'static str,
        /// Offending value as written on the wire.
        value: String,
    },
    /// Negative number for an unsigned field.
    #[error("value {0} must not be negative")]
    NegativeUnsigned(i64),
    /// Enum number not declared by the enum type.
    #[error("unknown enum value {value} for {enum_name}")]
    UnknownEnumValue {
        /// Name of the enum type.
        enum_name: String,
        /// Offending number.
        value: i64,
    },
    /// Enum name not declared by the enum type.
    #[error("unknown enum name {name:?} for {enum_name}")]
    UnknownEnumName {
        /// Name of the enum type.
        enum_name: String,
        /// Offending symbolic name.
        name: String,
    },
    /// Message type name not present in the registry.
    #[error("unknown message type {0}")]
    UnknownMessageType(String),
    /// Named field that the message type does not declare.
    #[error("message {message} has no field named {name:?}")]
    UnknownFieldName {
        /// Message type name.
        message: String,
        /// Offending field name.
        name: String,
    },
    /// Bytes field text is not valid standard base64.
    #[error("invalid base64: {0}")]
    InvalidBase64(String),
    /// Schema definition problem.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading or assembling a schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Field number outside `1..=536_870_911`.
    #[error("message {message}: field {field} has invalid number {number}")]
    InvalidFieldNumber {
        /// Owning message type.
        message: String,
        /// Field name.
        field: String,
        /// Offending number.
        number: u32,
    },
    /// Two fields share a number.
    #[error("message {message}: field number {number} declared twice")]
    DuplicateFieldNumber {
        /// Owning message type.
        message: String,
        /// Duplicated number.
        number: u32,
    },
    /// Two fields share a name.
    #[error("message {message}: field name {name:?} declared twice")]
    DuplicateFieldName {
        /// Owning message type.
        message: String,
        /// Duplicated name.
        name: String,
    },
    /// Message or enum field without a `type` reference.
    #[error("message {message}: field {field} of kind {kind} needs a type name")]
    MissingTypeName {
        /// Owning message type.
        message: String,
        /// Field name.
        field: String,
        /// Field kind.
        kind: &'static str,
    },
    /// Scalar field carrying a `type` reference.
    #[error("message {message}: scalar field {field} must not name a type")]
    UnexpectedTypeName {
        /// Owning message type.
        message: String,
        /// Field name.
        field: String,
    },
    /// `type` reference that resolves to nothing.
    #[error("message {message}: field {field} references unknown type {type_name}")]
    UnknownType {
        /// Owning message type.
        message: String,
        /// Field name.
        field: String,
        /// Unresolved type name.
        type_name: String,
    },
    /// Default declared on a field that cannot carry one.
    #[error("message {message}: field {field} has an invalid default")]
    InvalidDefault {
        /// Owning message type.
        message: String,
        /// Field name.
        field: String,
    },
    /// Enum declared without values.
    #[error("enum {0} declares no values")]
    EmptyEnum(String),
    /// Message or enum name declared twice.
    #[error("type {0} declared twice")]
    DuplicateType(String),
    /// Unknown field kind spelling in a schema file.
    #[error("unknown field kind {0:?}")]
    UnknownKind(String),
    /// TOML schema file failed to parse.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON schema file failed to parse.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PbliteError>;
