//! Variant classification.
//!
//! The registry guarantees that within one opcode bucket at most one
//! variant accepts any word, so the first match is the only match.

use std::sync::Arc;

use tpudis_core::BitSlice;

use crate::variant::VariantDescriptor;

/// Finds the variant of `bucket` whose predicate accepts `word`.
pub fn classify<'a>(
    bucket: &'a [Arc<VariantDescriptor>],
    word: &BitSlice<'_>,
) -> Option<&'a Arc<VariantDescriptor>> {
    bucket.iter().find(|variant| variant.accepts(word))
}

/// Shortest candidate that would accept `word` if it were long enough.
///
/// `None` means the word is not merely short but matches nothing.
pub(crate) fn truncated_candidate(
    bucket: &[Arc<VariantDescriptor>],
    word: &BitSlice<'_>,
) -> Option<usize> {
    bucket
        .iter()
        .filter(|variant| variant.len_bits() > word.len() && variant.accepts_prefix(word))
        .map(|variant| variant.len_bits())
        .min()
}
