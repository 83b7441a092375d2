//! The variant registry: per-engine opcode buckets built once at startup.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tpudis_core::{BitSlice, Engine};
use tracing::{debug, trace};

use crate::convert::ConverterTable;
use crate::layout::LayoutSource;
use crate::stream::StreamConfig;
use crate::variant::{VariantDecl, VariantDescriptor};
use crate::{DecodeError, Disassembler, EngineDecoder, Instruction, RegistryError};

/// Variants of one engine grouped by opcode.
#[derive(Debug, Default)]
pub(crate) struct EngineTable {
    buckets: BTreeMap<u64, Vec<Arc<VariantDescriptor>>>,
    min_bits: Option<usize>,
    max_bits: usize,
}

impl EngineTable {
    fn insert(&mut self, variant: Arc<VariantDescriptor>) {
        let len = variant.len_bits();
        self.min_bits = Some(self.min_bits.map_or(len, |min| min.min(len)));
        self.max_bits = self.max_bits.max(len);
        self.buckets.entry(variant.opcode()).or_default().push(variant);
    }

    pub(crate) fn bucket(&self, opcode: u64) -> Option<&[Arc<VariantDescriptor>]> {
        self.buckets.get(&opcode).map(Vec::as_slice)
    }

    pub(crate) fn min_bits(&self) -> usize {
        self.min_bits.unwrap_or(0)
    }

    pub(crate) fn max_bits(&self) -> usize {
        self.max_bits
    }

    fn variants(&self) -> impl Iterator<Item = &Arc<VariantDescriptor>> {
        self.buckets.values().flatten()
    }

    fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Two variants whose predicates both accept the same classifier values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub engine: Engine,
    pub opcode: u64,
    pub short: bool,
    pub discriminant: u64,
    pub first: &'static str,
    pub second: &'static str,
}

impl From<Overlap> for RegistryError {
    fn from(o: Overlap) -> Self {
        RegistryError::Overlap {
            engine: o.engine,
            opcode: o.opcode,
            short: o.short,
            discriminant: o.discriminant,
            first: o.first.to_string(),
            second: o.second.to_string(),
        }
    }
}

/// Explicit, ordered registration of variants.
///
/// ```no_run
/// # use tpudis_disasm::{Registry, LayoutTable, RegistryError};
/// # use tpudis_disasm::bm1684x::{BDC_VARIANTS, GDMA_VARIANTS};
/// # fn build(layouts: &LayoutTable) -> Result<Registry, RegistryError> {
/// let registry = Registry::builder(layouts)
///     .register_all(BDC_VARIANTS)?
///     .register_all(GDMA_VARIANTS)?
///     .build()?;
/// # Ok(registry)
/// # }
/// ```
pub struct RegistryBuilder<'l> {
    layouts: &'l dyn LayoutSource,
    converters: ConverterTable,
    bdc: EngineTable,
    gdma: EngineTable,
    keys: HashSet<&'static str>,
}

impl<'l> RegistryBuilder<'l> {
    pub fn new(layouts: &'l dyn LayoutSource) -> Self {
        Self {
            layouts,
            converters: ConverterTable::new(),
            bdc: EngineTable::default(),
            gdma: EngineTable::default(),
            keys: HashSet::new(),
        }
    }

    /// Sets the converters attached to variants registered after this call.
    pub fn converters(mut self, converters: ConverterTable) -> Self {
        self.converters = converters;
        self
    }

    /// Registers one variant.
    ///
    /// Resolves its layout, validates it, and checks the classifier bits
    /// lie inside the declared length.
    pub fn register(mut self, decl: &VariantDecl) -> Result<Self, RegistryError> {
        if !self.keys.insert(decl.key) {
            return Err(RegistryError::DuplicateVariant {
                key: decl.key.to_string(),
            });
        }

        let layout = self
            .layouts
            .layout(decl.key)
            .ok_or_else(|| RegistryError::MissingLayout {
                key: decl.key.to_string(),
            })?
            .clone();
        layout.validate(decl.key)?;

        let descriptor = VariantDescriptor::new(*decl, layout, self.converters.get(decl.key));
        check_classifier_bits(&descriptor)?;

        trace!(
            key = decl.key,
            engine = %descriptor.engine(),
            opcode = descriptor.opcode(),
            len_bits = descriptor.len_bits(),
            "variant registered"
        );

        let table = match descriptor.engine() {
            Engine::Bdc => &mut self.bdc,
            Engine::Gdma => &mut self.gdma,
        };
        table.insert(Arc::new(descriptor));
        Ok(self)
    }

    /// Registers variants in order.
    pub fn register_all(self, decls: &[VariantDecl]) -> Result<Self, RegistryError> {
        decls.iter().try_fold(self, |builder, decl| builder.register(decl))
    }

    /// Finishes registration.
    ///
    /// Fails if any two variants of an opcode bucket accept a common word.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let registry = Registry {
            bdc: self.bdc,
            gdma: self.gdma,
        };
        if let Some(overlap) = registry.overlaps().into_iter().next() {
            return Err(overlap.into());
        }
        for engine in Engine::ALL {
            let table = registry.table(engine);
            debug!(
                %engine,
                variants = table.len(),
                opcodes = table.buckets.len(),
                min_bits = table.min_bits(),
                max_bits = table.max_bits(),
                "registry built"
            );
        }
        Ok(registry)
    }
}

impl fmt::Debug for RegistryBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys.iter().collect();
        keys.sort();
        f.debug_struct("RegistryBuilder")
            .field("keys", &keys)
            .field("converters", &self.converters)
            .finish_non_exhaustive()
    }
}

fn check_classifier_bits(variant: &VariantDescriptor) -> Result<(), RegistryError> {
    let engine = variant.engine();
    let len = variant.len_bits();
    let out_of_range = |what: &'static str, start: usize, end: usize| {
        (end > len).then(|| RegistryError::ClassifierOutOfRange {
            key: variant.key().to_string(),
            what,
            start,
            end,
            len,
        })
    };

    let short = engine.short_form_bit();
    let opcode = engine.opcode_bits();
    let disc = engine.discriminant_bits();
    let checks = [
        variant
            .form()
            .expected()
            .and_then(|_| out_of_range("short-form bit", short, short + 1)),
        out_of_range("opcode", opcode.start, opcode.end),
        (!variant.discriminants().is_any())
            .then(|| out_of_range(engine.discriminant_name(), disc.start, disc.end))
            .flatten(),
    ];
    match checks.into_iter().flatten().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Immutable lookup from opcode to candidate variants, per engine.
///
/// Built once by [`RegistryBuilder`]; safe to share across threads.
#[derive(Debug)]
pub struct Registry {
    bdc: EngineTable,
    gdma: EngineTable,
}

impl Registry {
    /// Starts an explicit registration.
    pub fn builder(layouts: &dyn LayoutSource) -> RegistryBuilder<'_> {
        RegistryBuilder::new(layouts)
    }

    /// Builds the full BM1684X catalog.
    #[cfg(feature = "bm1684x")]
    pub fn bm1684x(
        layouts: &dyn LayoutSource,
        converters: ConverterTable,
    ) -> Result<Self, RegistryError> {
        crate::bm1684x::registry(layouts, converters)
    }

    pub(crate) fn table(&self, engine: Engine) -> &EngineTable {
        match engine {
            Engine::Bdc => &self.bdc,
            Engine::Gdma => &self.gdma,
        }
    }

    /// A decoder for one engine's command stream.
    pub fn decoder(&self, engine: Engine) -> EngineDecoder<'_> {
        EngineDecoder::new(self, engine)
    }

    /// Decodes every command of `engine` in `bytes`.
    pub fn decode_all(
        &self,
        engine: Engine,
        bytes: &[u8],
        config: &StreamConfig,
    ) -> Result<Vec<Instruction>, DecodeError> {
        self.decoder(engine)
            .disassemble_block(BitSlice::new(bytes), config)
    }

    /// Decodes the single command of `engine` at bit `offset` of `bytes`.
    pub fn decode_at(
        &self,
        engine: Engine,
        bytes: &[u8],
        offset: usize,
    ) -> Result<Instruction, DecodeError> {
        self.decoder(engine)
            .decode_instruction(BitSlice::new(bytes), offset)
    }

    /// Candidate variants sharing an opcode, in registration order.
    pub fn bucket(&self, engine: Engine, opcode: u64) -> Option<&[Arc<VariantDescriptor>]> {
        self.table(engine).bucket(opcode)
    }

    /// Every variant of an engine, grouped by ascending opcode.
    pub fn variants(&self, engine: Engine) -> impl Iterator<Item = &Arc<VariantDescriptor>> {
        self.table(engine).variants()
    }

    /// Looks a variant up by registration key.
    pub fn get(&self, key: &str) -> Option<&Arc<VariantDescriptor>> {
        Engine::ALL
            .into_iter()
            .flat_map(|engine| self.variants(engine))
            .find(|variant| variant.key() == key)
    }

    /// Number of registered variants across both engines.
    pub fn len(&self) -> usize {
        self.bdc.len() + self.gdma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerates every short-form bit and discriminant value of every
    /// bucket and reports each pair of variants that both accept it.
    pub fn overlaps(&self) -> Vec<Overlap> {
        let mut found = Vec::new();
        for engine in Engine::ALL {
            for (&opcode, bucket) in &self.table(engine).buckets {
                for short in [false, true] {
                    for discriminant in 0..engine.discriminant_space() {
                        let accepting: Vec<_> = bucket
                            .iter()
                            .filter(|v| v.admits(short, opcode, discriminant))
                            .collect();
                        for (i, first) in accepting.iter().enumerate() {
                            for second in &accepting[i + 1..] {
                                found.push(Overlap {
                                    engine,
                                    opcode,
                                    short,
                                    discriminant,
                                    first: first.key(),
                                    second: second.key(),
                                });
                            }
                        }
                    }
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FieldLayout, LayoutTable};
    use crate::variant::{Discriminants, VariantBase};

    static CONV: VariantBase = VariantBase::named(Engine::Bdc, 0, &[(0, "conv.normal")]);
    static CONV_TOO: VariantBase = VariantBase::named(Engine::Bdc, 0, &[(0, "conv.other")]);
    static ANY: VariantBase = VariantBase {
        engine: Engine::Gdma,
        opcode: 2,
        discriminants: Discriminants::Any,
        op_name: Some("dma.masked_select"),
        alias: None,
    };

    fn bdc_layout(len: usize) -> FieldLayout {
        [
            ("cmd_short", 1),
            ("cmd_id", 21),
            ("cmd_id_dep", 41),
            ("tsk_typ", 45),
            ("tsk_eu_typ", 50),
            ("rest", len),
        ]
        .into_iter()
        .collect()
    }

    fn layouts() -> LayoutTable {
        LayoutTable::new()
            .with("CONV", bdc_layout(128))
            .with("sCONV", bdc_layout(64))
            .with("CONV2", bdc_layout(128))
            .with(
                "DMA_masked_select",
                [
                    ("cmd_short", 4),
                    ("cmd_id", 24),
                    ("cmd_id_dep", 32),
                    ("cmd_type", 36),
                    ("rest", 96),
                ]
                .into_iter()
                .collect(),
            )
    }

    #[test]
    fn builds_buckets_in_order() {
        let layouts = layouts();
        let registry = Registry::builder(&layouts)
            .register(&VariantDecl::long("CONV", &CONV, "convolution"))
            .unwrap()
            .register(&VariantDecl::short("sCONV", &CONV, "short convolution"))
            .unwrap()
            .register(&VariantDecl::long("DMA_masked_select", &ANY, "DMA masked select"))
            .unwrap()
            .build()
            .unwrap();

        let keys: Vec<_> = registry
            .bucket(Engine::Bdc, 0)
            .unwrap()
            .iter()
            .map(|v| v.key())
            .collect();
        assert_eq!(keys, ["CONV", "sCONV"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.table(Engine::Bdc).min_bits(), 64);
        assert_eq!(registry.table(Engine::Bdc).max_bits(), 128);
        assert_eq!(registry.get("sCONV").unwrap().len_bits(), 64);
        assert!(registry.bucket(Engine::Gdma, 0).is_none());
    }

    #[test]
    fn missing_layout_is_fatal() {
        let layouts = LayoutTable::new();
        let err = Registry::builder(&layouts)
            .register(&VariantDecl::long("CONV", &CONV, "convolution"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::MissingLayout {
                key: "CONV".to_string()
            }
        );
    }

    #[test]
    fn duplicate_key_is_fatal() {
        let layouts = layouts();
        let err = Registry::builder(&layouts)
            .register(&VariantDecl::long("CONV", &CONV, "convolution"))
            .unwrap()
            .register(&VariantDecl::long("CONV", &CONV, "convolution"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateVariant { .. }));
    }

    #[test]
    fn classifier_bits_must_fit() {
        let layouts = LayoutTable::new().with(
            "CONV",
            [("cmd_short", 1), ("cmd_id", 21), ("cmd_id_dep", 41), ("tsk_typ", 45)]
                .into_iter()
                .collect(),
        );
        let err = Registry::builder(&layouts)
            .register(&VariantDecl::long("CONV", &CONV, "convolution"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::ClassifierOutOfRange {
                key: "CONV".to_string(),
                what: "eu_type",
                start: 45,
                end: 50,
                len: 45
            }
        );
    }

    #[test]
    fn builder_debug_lists_keys() {
        let layouts = layouts();
        let builder = Registry::builder(&layouts)
            .register(&VariantDecl::short("sCONV", &CONV, "short convolution"))
            .unwrap()
            .register(&VariantDecl::long("CONV", &CONV, "convolution"))
            .unwrap();
        let text = format!("{:?}", builder);
        assert!(text.starts_with("RegistryBuilder"));
        assert!(text.contains(r#"keys: ["CONV", "sCONV"]"#), "{}", text);
    }

    #[test]
    fn wildcard_variant_may_end_before_discriminant() {
        let layouts = LayoutTable::new().with(
            "DMA_masked_select",
            [("cmd_short", 4), ("cmd_id", 24), ("cmd_id_dep", 32), ("cmd_type", 36)]
                .into_iter()
                .collect(),
        );
        let registry = Registry::builder(&layouts)
            .register(&VariantDecl::long("DMA_masked_select", &ANY, "DMA masked select"))
            .unwrap()
            .build()
            .unwrap();

        let word = 5u64 << 4 | 2 << 32;
        let insn = registry
            .decode_at(Engine::Gdma, &word.to_le_bytes()[..5], 0)
            .unwrap();
        assert_eq!(insn.size_bits(), 36);
        assert_eq!(insn.cmd_id(), 5);
        assert_eq!(insn.discriminant(), None);
        assert_eq!(insn.op_name(), "dma.masked_select");
    }

    #[test]
    fn overlapping_variants_are_rejected() {
        let layouts = layouts();
        let err = Registry::builder(&layouts)
            .register(&VariantDecl::long("CONV", &CONV, "convolution"))
            .unwrap()
            .register(&VariantDecl::either("CONV2", &CONV_TOO, "convolution again"))
            .unwrap()
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::Overlap {
                engine: Engine::Bdc,
                opcode: 0,
                short: false,
                discriminant: 0,
                first: "CONV".to_string(),
                second: "CONV2".to_string(),
            }
        );
    }

    #[test]
    fn long_and_short_forms_do_not_overlap() {
        let layouts = layouts();
        let registry = Registry::builder(&layouts)
            .register_all(&[
                VariantDecl::long("CONV", &CONV, "convolution"),
                VariantDecl::short("sCONV", &CONV, "short convolution"),
            ])
            .unwrap()
            .build()
            .unwrap();
        assert!(registry.overlaps().is_empty());
    }
}
