//! Schema configuration errors.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building a packet schema.
///
/// All of these are configuration mistakes in a packet definition and are
/// meant to abort startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// Two fields in the same field list share a name.
    #[error("packet {packet}: duplicate field name {field:?}")]
    DuplicateFieldName { packet: String, field: String },

    /// More than one field is marked as the version identifier.
    #[error("packet {packet}: fields {first:?} and {second:?} are both version identifiers")]
    MultipleVersionIdentifiers {
        packet: String,
        first: String,
        second: String,
    },

    /// The version identifier is not a top-level unsigned integer.
    #[error("packet {packet}: version identifier {field:?} must be a top-level unsigned integer")]
    InvalidVersionIdentifier { packet: String, field: String },

    /// A looping field has no continuation flag.
    #[error("packet {packet}: looping field {field:?} has no continuation flag")]
    MissingContinueFlag { packet: String, field: String },

    /// A looping field has more than one continuation flag.
    #[error("packet {packet}: looping field {field:?} has more than one continuation flag")]
    MultipleContinueFlags { packet: String, field: String },

    /// A continuation flag is not a boolean, or appears outside a looping field.
    #[error("packet {packet}: continuation flag {field:?} must be a boolean inside a looping field")]
    InvalidContinueFlag { packet: String, field: String },

    /// A grouped field's stated count disagrees with its field list.
    #[error("packet {packet}: grouped field {field:?} states {expected} fields but defines {actual}")]
    GroupCountMismatch {
        packet: String,
        field: String,
        expected: usize,
        actual: usize,
    },

    /// An aggregate field has no sub-fields.
    #[error("packet {packet}: aggregate field {field:?} has no sub-fields")]
    EmptyAggregate { packet: String, field: String },

    /// A string field has a zero trim length.
    #[error("packet {packet}: string field {field:?} has trim length 0")]
    InvalidTrimLength { packet: String, field: String },

    /// A JSON field has a zero length limit.
    #[error("packet {packet}: json field {field:?} has length limit 0")]
    InvalidJsonLimit { packet: String, field: String },

    /// A repeating field's count prefix is not an unsigned integer.
    #[error("packet {packet}: repeating field {field:?} needs an unsigned count prefix")]
    InvalidRepeatCount { packet: String, field: String },

    /// A concrete packet was declared without a packet id.
    #[error("packet {packet}: no packet id set on a non-abstract packet")]
    MissingPacketId { packet: String },

    /// A field referenced by name does not exist.
    #[error("packet {packet}: no field named {field:?}")]
    UnknownField { packet: String, field: String },
}
