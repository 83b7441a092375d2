//! Registry and decoding error types.

use thiserror::Error;
use tpudis_core::Engine;

/// Configuration error raised while building a [`Registry`](crate::Registry).
///
/// All of these stem from static layout or catalog data and abort
/// initialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No layout is registered under the variant's key.
    #[error("no field layout for variant `{key}`")]
    MissingLayout { key: String },

    /// The layout is structurally broken.
    #[error("invalid field layout for `{key}`: {reason}")]
    InvalidLayout { key: String, reason: String },

    /// A field is wider than the extraction integer.
    #[error("field `{field}` of `{key}` is {width} bits wide (limit is 64)")]
    FieldTooWide {
        key: String,
        field: String,
        width: usize,
    },

    /// A field the decoder depends on is not declared.
    #[error("layout `{key}` does not declare required field `{field}`")]
    MissingField { key: String, field: String },

    /// A classifier bit lies beyond the variant's encoded length.
    #[error("`{key}` is {len} bits long but its {what} lies at bits {start}..{end}")]
    ClassifierOutOfRange {
        key: String,
        what: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },

    /// The same key was registered twice.
    #[error("variant `{key}` registered twice")]
    DuplicateVariant { key: String },

    /// Two variants in one opcode bucket accept the same word.
    #[error(
        "{engine} variants `{first}` and `{second}` overlap at opcode {opcode}, \
         short form {short}, discriminant {discriminant}"
    )]
    Overlap {
        engine: Engine,
        opcode: u64,
        short: bool,
        discriminant: u64,
        first: String,
        second: String,
    },
}

impl RegistryError {
    /// Creates a new InvalidLayout error.
    pub fn invalid_layout(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLayout {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a new MissingField error.
    pub fn missing_field(key: &str, field: &str) -> Self {
        Self::MissingField {
            key: key.to_string(),
            field: field.to_string(),
        }
    }
}

/// Error type for command decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bits remain than the candidate variants need.
    #[error("truncated {engine} command at bit {offset}: need {needed} bits, have {available}")]
    Truncated {
        engine: Engine,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// No registered variant accepts the word.
    #[error(
        "unrecognized {engine} command at bit {offset}: opcode {opcode}, discriminant {}",
        .discriminant.map_or_else(|| "n/a".to_string(), |d| d.to_string())
    )]
    Unrecognized {
        engine: Engine,
        offset: usize,
        opcode: u64,
        discriminant: Option<u64>,
    },

    /// A matched variant's layout lacks a field the decoder needs.
    #[error("variant `{variant}` has no `{field}` field")]
    MissingField { variant: String, field: String },

    /// Bit access failed.
    #[error(transparent)]
    Bits(#[from] tpudis_core::Error),
}

impl DecodeError {
    /// Creates a new Truncated error.
    pub fn truncated(engine: Engine, offset: usize, needed: usize, available: usize) -> Self {
        Self::Truncated {
            engine,
            offset,
            needed,
            available,
        }
    }

    /// Creates a new Unrecognized error.
    pub fn unrecognized(
        engine: Engine,
        offset: usize,
        opcode: u64,
        discriminant: Option<u64>,
    ) -> Self {
        Self::Unrecognized {
            engine,
            offset,
            opcode,
            discriminant,
        }
    }

    /// Creates a new MissingField error.
    pub fn missing_field(variant: &str, field: &str) -> Self {
        Self::MissingField {
            variant: variant.to_string(),
            field: field.to_string(),
        }
    }

    /// Returns true for a short remainder rather than a bad word.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}
