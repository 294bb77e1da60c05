//! Failures when reading an identifier back from text.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("empty identifier")]
    Empty,

    /// Text carried another family's prefix, e.g. `area_3` read as a `ThingId`.
    #[error("wrong identifier prefix: wanted '{expected}', found '{actual}'")]
    InvalidPrefix {
        expected: &'static str,
        actual: String,
    },

    #[error("identifier has no '_' between prefix and value")]
    MissingSeparator,

    #[error("malformed ULID: {0}")]
    InvalidUlid(String),

    #[error("malformed host number: {0}")]
    InvalidNumber(String),

    #[error("unknown designation kind: {0}")]
    UnknownKind(String),
}

impl IdError {
    /// True when the text names a different family (or no family at all).
    pub fn is_prefix_error(&self) -> bool {
        matches!(self, IdError::InvalidPrefix { .. } | IdError::MissingSeparator)
    }
}
