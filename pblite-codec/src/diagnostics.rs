//! Diagnostics emitted while decoding
//!
//! Decoding is permissive: problems are reported to an [`Observer`] and the
//! decoder moves on. [`TracingObserver`] forwards events to `tracing`;
//! [`DiagnosticLog`] keeps them for inspection; any `FnMut(Diagnostic)`
//! closure works as well.

use pblite_format::PbliteError;
use serde_json::Value;
use std::fmt;

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational, e.g. an unknown field carrying data
    Debug,
    /// Input was ignored
    Warning,
}

/// Field a diagnostic is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// Field number
    pub number: u32,
    /// Field name, when the schema declares the number
    pub name: Option<String>,
    /// Whether the field is repeated
    pub repeated: bool,
}

/// What went wrong.
#[derive(Debug)]
pub enum DiagnosticCause {
    /// The message value is not an array; nothing was decoded
    NotAnArray {
        /// JSON type that was found
        found: &'static str,
    },
    /// The schema declares no field with this number
    UnknownField {
        /// The ignored value
        value: Value,
    },
    /// An overflow map key is not a field number
    InvalidFieldNumber {
        /// The raw key
        key: String,
    },
    /// The value could not be converted; the field keeps its prior value
    FieldValue(PbliteError),
}

/// One decode diagnostic.
#[derive(Debug)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Name of the message type being decoded
    pub message_type: String,
    /// Affected field, if any
    pub field: Option<FieldRef>,
    /// Cause
    pub cause: DiagnosticCause,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.cause, &self.field) {
            (DiagnosticCause::NotAnArray { found }, Some(field)) => write!(
                f,
                "Message {:?} ignoring field {}: expected list, got {}",
                self.message_type,
                field_label(field),
                found
            ),
            (DiagnosticCause::NotAnArray { found }, None) => write!(
                f,
                "Ignoring invalid message {:?}: expected list, got {}",
                self.message_type, found
            ),
            (DiagnosticCause::UnknownField { value }, _) => write!(
                f,
                "Message {:?} contains unknown field {} with value {}",
                self.message_type,
                self.field.as_ref().map_or(0, |field| field.number),
                value
            ),
            (DiagnosticCause::InvalidFieldNumber { key }, _) => write!(
                f,
                "Message {:?} ignoring overflow entry with invalid field number {:?}",
                self.message_type, key
            ),
            (DiagnosticCause::FieldValue(err), Some(field)) => write!(
                f,
                "Message {:?} ignoring {}field {}: {}",
                self.message_type,
                if field.repeated { "repeated " } else { "" },
                field_label(field),
                err
            ),
            (DiagnosticCause::FieldValue(err), None) => {
                write!(f, "Message {:?} ignoring value: {}", self.message_type, err)
            }
        }
    }
}

fn field_label(field: &FieldRef) -> String {
    match &field.name {
        Some(name) => name.clone(),
        None => field.number.to_string(),
    }
}

/// Receiver of decode diagnostics.
pub trait Observer {
    /// Handle one diagnostic.
    fn observe(&mut self, diagnostic: Diagnostic);
}

impl<F> Observer for F
where
    F: FnMut(Diagnostic),
{
    fn observe(&mut self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

/// Forwards diagnostics to `tracing` at `warn` and `debug` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&mut self, diagnostic: Diagnostic) {
        let field_number = diagnostic.field.as_ref().map(|field| field.number);
        let field_name = diagnostic
            .field
            .as_ref()
            .and_then(|field| field.name.as_deref());

        match diagnostic.severity {
            Severity::Warning => tracing::warn!(
                message_type = %diagnostic.message_type,
                field_number,
                field_name,
                "{}",
                diagnostic
            ),
            Severity::Debug => tracing::debug!(
                message_type = %diagnostic.message_type,
                field_number,
                field_name,
                "{}",
                diagnostic
            ),
        }
    }
}

/// Collects diagnostics in arrival order.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    events: Vec<Diagnostic>,
}

impl DiagnosticLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events observed so far.
    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    /// Number of events with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.events
            .iter()
            .filter(|event| event.severity == severity)
            .count()
    }

    /// Whether nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take the collected events.
    pub fn into_events(self) -> Vec<Diagnostic> {
        self.events
    }
}

impl Observer for DiagnosticLog {
    fn observe(&mut self, diagnostic: Diagnostic) {
        self.events.push(diagnostic);
    }
}
