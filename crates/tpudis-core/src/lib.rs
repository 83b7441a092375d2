//! # tpudis-core
//!
//! Core abstractions for the tpudis command-word disassembler. This crate
//! defines engine identities, bit-addressable views over command buffers,
//! the decoded field mapping, and the semantic triple attached to each
//! decoded instruction.

pub mod bits;
pub mod engine;
pub mod error;
pub mod fields;
pub mod semantics;

pub use bits::{extract_bits, BitSlice, RawWord, MAX_FIELD_BITS};
pub use engine::Engine;
pub use error::Error;
pub use fields::{FieldMap, CMD_ID, CMD_ID_DEP, REQUIRED_FIELDS};
pub use semantics::{Attributes, Semantics, Value};
