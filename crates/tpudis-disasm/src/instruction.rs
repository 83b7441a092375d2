//! Decoded instruction representation.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;
use tpudis_core::{Engine, FieldMap, RawWord, Semantics};

use crate::variant::VariantDescriptor;

/// One decoded command word.
///
/// Identity is the raw bit content: two instructions compare equal (and hash
/// alike) exactly when their raw words are bit-identical, whatever variant
/// they were decoded as.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub(crate) variant: Arc<VariantDescriptor>,
    pub(crate) offset: usize,
    pub(crate) raw: RawWord,
    pub(crate) fields: FieldMap,
    pub(crate) cmd_id: u64,
    pub(crate) cmd_id_dep: u64,
    pub(crate) discriminant: Option<u64>,
    pub(crate) semantics: Semantics,
}

impl Instruction {
    /// The variant this word was classified as.
    pub fn variant(&self) -> &Arc<VariantDescriptor> {
        &self.variant
    }

    /// Registration key of the variant.
    pub fn key(&self) -> &'static str {
        self.variant.key()
    }

    pub fn engine(&self) -> Engine {
        self.variant.engine()
    }

    /// Bit offset of the command within the decoded buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Encoded length in bits.
    pub fn size_bits(&self) -> usize {
        self.raw.len()
    }

    /// Bit offset just past this command.
    pub fn end_offset(&self) -> usize {
        self.offset + self.size_bits()
    }

    pub fn raw(&self) -> &RawWord {
        &self.raw
    }

    /// Decoded fields in layout order.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Sequence number within this engine's issue order.
    pub fn cmd_id(&self) -> u64 {
        self.cmd_id
    }

    /// `cmd_id` of the other engine's command this one waits on.
    pub fn cmd_id_dep(&self) -> u64 {
        self.cmd_id_dep
    }

    /// Value of the engine's discriminant bits, or `None` when the encoding
    /// ends before them.
    pub fn discriminant(&self) -> Option<u64> {
        self.discriminant
    }

    pub fn semantics(&self) -> &Semantics {
        &self.semantics
    }

    /// Resolved op name.
    pub fn op_name(&self) -> &'static str {
        self.variant.op_name(self.discriminant)
    }

    /// Flattens the instruction for serialization.
    pub fn to_record(&self, with_fields: bool) -> InstructionRecord {
        InstructionRecord {
            engine: self.engine(),
            key: self.key(),
            offset: self.offset,
            size_bits: self.size_bits(),
            cmd_id: self.cmd_id,
            cmd_id_dep: self.cmd_id_dep,
            op_name: self.op_name(),
            text: self.to_string(),
            raw: self.raw.to_string(),
            fields: with_fields.then(|| self.fields.clone()),
        }
    }
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Instruction {}

impl Hash for Instruction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

/// Serializable view of an [`Instruction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionRecord {
    pub engine: Engine,
    pub key: &'static str,
    pub offset: usize,
    pub size_bits: usize,
    pub cmd_id: u64,
    pub cmd_id_dep: u64,
    pub op_name: &'static str,
    pub text: String,
    /// Raw word as hex.
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldMap>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FieldLayout;
    use crate::variant::{VariantBase, VariantDecl};
    use std::collections::hash_map::DefaultHasher;

    static SFU: VariantBase =
        VariantBase::named(Engine::Bdc, 9, &[(12, "sfu.tailor_4x"), (17, "sfu.rsqrt")]);

    fn instruction(key: &'static str, bytes: &[u8], cmd_id: u64) -> Instruction {
        let layout: FieldLayout = [("cmd_id", 20), ("cmd_id_dep", 40), ("rest", 64)]
            .into_iter()
            .collect();
        let decl = VariantDecl::long(key, &SFU, "special_function");
        Instruction {
            variant: Arc::new(VariantDescriptor::new(decl, layout, None)),
            offset: 0,
            raw: RawWord::from_bytes(bytes, 64).unwrap(),
            fields: [("cmd_id", cmd_id), ("cmd_id_dep", 0)].into_iter().collect(),
            cmd_id,
            cmd_id_dep: 0,
            discriminant: Some(17),
            semantics: Semantics::default(),
        }
    }

    fn hash_of(insn: &Instruction) -> u64 {
        let mut hasher = DefaultHasher::new();
        insn.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equality_follows_raw_bits() {
        let a = instruction("SFU", &[1, 2, 3, 4, 5, 6, 7, 8], 1);
        // Same bits, different interpretation.
        let b = instruction("sSFU", &[1, 2, 3, 4, 5, 6, 7, 8], 99);
        let c = instruction("SFU", &[1, 2, 3, 4, 5, 6, 7, 9], 1);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn record_carries_identity() {
        let insn = instruction("SFU", &[0; 8], 3);
        assert_eq!(insn.op_name(), "sfu.rsqrt");
        assert_eq!(insn.end_offset(), 64);

        let record = insn.to_record(true);
        assert_eq!(record.key, "SFU");
        assert_eq!(record.text, "special_function");
        assert_eq!(record.fields.as_ref().and_then(|f| f.get("cmd_id")), Some(3));
        assert!(insn.to_record(false).fields.is_none());
    }
}
