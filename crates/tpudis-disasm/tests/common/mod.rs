//! Shared helpers for integration tests: the catalog fixture and a word encoder.

#![allow(dead_code)]

use std::ops::Range;
use std::sync::{Arc, OnceLock};

use tpudis_disasm::{
    ConverterTable, Discriminants, Engine, LayoutTable, Registry, VariantDescriptor,
};

pub const LAYOUTS_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../tests/fixtures/bm1684x_layouts.json"
));

pub fn layouts() -> LayoutTable {
    LayoutTable::from_json(LAYOUTS_JSON).expect("fixture parses")
}

/// The BM1684X catalog built against the fixture, without converters.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        Registry::bm1684x(&layouts(), ConverterTable::new()).expect("catalog builds")
    })
}

/// Every variant of an engine in bucket order.
pub fn variants(engine: Engine) -> Vec<Arc<VariantDescriptor>> {
    registry().variants(engine).cloned().collect()
}

/// Discriminant codes a variant accepts.
pub fn accepted_codes(variant: &VariantDescriptor) -> Vec<u64> {
    match variant.discriminants() {
        Discriminants::Any => (0..variant.engine().discriminant_space()).collect(),
        Discriminants::Named(table) => table.iter().map(|(code, _)| *code).collect(),
        Discriminants::Range(range) => range.clone().collect(),
        Discriminants::Codes(codes) => codes.to_vec(),
    }
}

pub fn mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Writes the low `width` bits of `value` at bit `start`, LSB first.
pub fn set_bits(bytes: &mut [u8], start: usize, width: usize, value: u64) {
    for i in 0..width {
        let bit = start + i;
        let flag = 1u8 << (bit % 8);
        if (value >> i) & 1 == 1 {
            bytes[bit / 8] |= flag;
        } else {
            bytes[bit / 8] &= !flag;
        }
    }
}

/// Returns true if `range` touches a bit the classifier reads.
pub fn is_classifier_field(engine: Engine, range: &Range<usize>) -> bool {
    let overlaps = |other: Range<usize>| range.start < other.end && other.start < range.end;
    let short = engine.short_form_bit();
    overlaps(short..short + 1)
        || overlaps(engine.opcode_bits())
        || overlaps(engine.discriminant_bits())
}

/// Encodes a word that `variant` accepts.
///
/// Fields take their value from `fields` (zero when absent), masked to
/// their width; the short-form bit, opcode and discriminant are then
/// written over whatever the fields put there.
pub fn encode(variant: &VariantDescriptor, discriminant: u64, fields: &[(&str, u64)]) -> Vec<u8> {
    let mut bytes = vec![0u8; variant.len_bits().div_ceil(8)];
    for (name, range) in variant.layout().ranges() {
        let value = fields
            .iter()
            .find(|(field, _)| *field == name)
            .map_or(0, |(_, value)| *value);
        set_bits(&mut bytes, range.start, range.len(), value & mask(range.len()));
    }

    let engine = variant.engine();
    if let Some(short) = variant.form().expected() {
        set_bits(&mut bytes, engine.short_form_bit(), 1, u64::from(short));
    }
    let opcode = engine.opcode_bits();
    set_bits(&mut bytes, opcode.start, opcode.len(), variant.opcode());
    let disc = engine.discriminant_bits();
    set_bits(&mut bytes, disc.start, disc.len(), discriminant);
    bytes
}
