//! Error types for tpudis-core.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A bit range reaches past the end of the view it was taken from.
    #[error("bit range {start}..{end} is outside a {len}-bit view")]
    OutOfRange { start: usize, end: usize, len: usize },

    /// A field is wider than the extraction integer.
    #[error("field of {width} bits exceeds the {max}-bit extraction limit")]
    FieldTooWide { width: usize, max: usize },

    /// A field the decoder depends on is absent from the mapping.
    #[error("required field `{0}` is missing")]
    MissingField(String),

    /// An engine name that does not name a known engine.
    #[error("unknown engine `{0}` (expected `bdc` or `gdma`)")]
    UnknownEngine(String),
}

impl Error {
    /// Creates a new OutOfRange error.
    pub fn out_of_range(start: usize, end: usize, len: usize) -> Self {
        Self::OutOfRange { start, end, len }
    }

    /// Creates a new FieldTooWide error.
    pub fn field_too_wide(width: usize) -> Self {
        Self::FieldTooWide {
            width,
            max: crate::MAX_FIELD_BITS,
        }
    }
}
