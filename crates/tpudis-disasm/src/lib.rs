//! # tpudis-disasm
//!
//! Command-word decoders for the two engines of the tensor processor:
//! - BDC, the compute engine
//! - GDMA, the data-movement engine
//!
//! Decoding is table driven. A [`Registry`] is built once from a field
//! layout table and an ordered list of variant declarations; it is then
//! read-only and can be shared between threads. An [`EngineDecoder`]
//! classifies each word against the candidates registered for its opcode,
//! splits it into fields, and produces an [`Instruction`] that renders as
//! IR-like text.

#[cfg(feature = "bm1684x")]
pub mod bm1684x;
pub mod classify;
pub mod convert;
mod decode;
pub mod error;
pub mod instruction;
pub mod layout;
pub mod registry;
mod render;
pub mod stream;
pub mod traits;
pub mod variant;

pub use classify::classify;
pub use convert::{Converter, ConverterTable};
pub use decode::EngineDecoder;
pub use error::{DecodeError, RegistryError};
pub use instruction::{Instruction, InstructionRecord};
pub use layout::{FieldLayout, FieldSpec, LayoutSource, LayoutTable};
pub use registry::{Overlap, Registry, RegistryBuilder};
pub use stream::{InstructionStream, StreamConfig, TrailingBits};
pub use traits::Disassembler;
pub use variant::{Discriminants, ShortForm, VariantBase, VariantDecl, VariantDescriptor};

pub use tpudis_core::{BitSlice, Engine};
