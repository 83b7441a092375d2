//! BM1684X command catalog.
//!
//! Declares every compute (BDC) and data-movement (GDMA) variant of the
//! BM1684X command encoding. Layout keys are the register-table sheet
//! names, spelled exactly as they appear in the tables.
//!
//! Compute commands carry the short-form flag in bit 0, the opcode in bits
//! 41..45 and the execution-unit type in bits 45..50. Data-movement
//! commands carry the flag in bit 3, the opcode in bits 32..36 and the
//! special-function code in bits 36..39.

mod bdc;
mod gdma;

pub use bdc::BDC_VARIANTS;
pub use gdma::GDMA_VARIANTS;

use crate::{ConverterTable, LayoutSource, Registry, RegistryError};

/// Builds a registry holding the full BM1684X catalog.
pub fn registry(
    layouts: &dyn LayoutSource,
    converters: ConverterTable,
) -> Result<Registry, RegistryError> {
    Registry::builder(layouts)
        .converters(converters)
        .register_all(BDC_VARIANTS)?
        .register_all(GDMA_VARIANTS)?
        .build()
}

/// Every layout key the catalog looks up.
pub fn layout_keys() -> impl Iterator<Item = &'static str> {
    BDC_VARIANTS
        .iter()
        .chain(GDMA_VARIANTS.iter())
        .map(|decl| decl.key)
}
