//! Constants for the pblite format

/// Smallest legal field number.
pub const MIN_FIELD_NUMBER: u32 = 1;

/// Largest legal field number (2^29 - 1, inherited from protobuf tags).
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Wire spelling of a float/double NaN.
pub const FLOAT_NAN: &str = "NaN";
/// Wire spelling of positive infinity.
pub const FLOAT_INFINITY: &str = "Infinity";
/// Wire spelling of negative infinity.
pub const FLOAT_NEG_INFINITY: &str = "-Infinity";
