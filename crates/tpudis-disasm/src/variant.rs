//! Variant descriptors: the static identity of one command kind.
//!
//! A variant is declared in two layers. [`VariantBase`] carries what long
//! and short encodings of the same operation share (engine, opcode,
//! discriminant set, naming). [`VariantDecl`] points at a base and adds
//! the registration key, the short-form requirement and the description.
//! The registry resolves each declaration against a layout table into a
//! [`VariantDescriptor`].

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use tpudis_core::{BitSlice, Engine};

use crate::convert::Converter;
use crate::layout::FieldLayout;

/// Which value of the engine's short-form bit a variant requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortForm {
    /// Bit must be clear.
    Long,
    /// Bit must be set.
    Short,
    /// Bit is not inspected.
    Either,
}

impl ShortForm {
    /// The bit value this form requires, if any.
    pub fn expected(self) -> Option<bool> {
        match self {
            Self::Long => Some(false),
            Self::Short => Some(true),
            Self::Either => None,
        }
    }

    /// Returns true if a word with short-form bit `bit` is acceptable.
    pub fn admits(self, bit: bool) -> bool {
        self.expected().map_or(true, |want| want == bit)
    }
}

/// Set of discriminant codes a variant accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discriminants {
    /// Any code.
    Any,
    /// Listed codes, each with its op name.
    Named(&'static [(u64, &'static str)]),
    /// An inclusive range of codes sharing the variant's op name.
    Range(RangeInclusive<u64>),
    /// Listed codes sharing the variant's op name.
    Codes(&'static [u64]),
}

impl Discriminants {
    /// Returns true if the set does not constrain the discriminant.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn contains(&self, code: u64) -> bool {
        match self {
            Self::Any => true,
            Self::Named(table) => table.iter().any(|(c, _)| *c == code),
            Self::Range(range) => range.contains(&code),
            Self::Codes(codes) => codes.contains(&code),
        }
    }

    /// Op name for `code` from a named table.
    pub fn name_of(&self, code: u64) -> Option<&'static str> {
        match self {
            Self::Named(table) => table.iter().find(|(c, _)| *c == code).map(|(_, n)| *n),
            _ => None,
        }
    }
}

/// What the long and short encodings of one operation share.
#[derive(Debug)]
pub struct VariantBase {
    pub engine: Engine,
    pub opcode: u64,
    pub discriminants: Discriminants,
    /// Op name used when the discriminant table does not name the code.
    pub op_name: Option<&'static str>,
    /// Fixed rendering that replaces the whole instruction text.
    pub alias: Option<&'static str>,
}

impl VariantBase {
    /// Base whose op name comes from a discriminant table.
    pub const fn named(
        engine: Engine,
        opcode: u64,
        table: &'static [(u64, &'static str)],
    ) -> Self {
        Self {
            engine,
            opcode,
            discriminants: Discriminants::Named(table),
            op_name: None,
            alias: None,
        }
    }

    /// Sets the fallback op name.
    pub const fn op_name(mut self, name: &'static str) -> Self {
        self.op_name = Some(name);
        self
    }

    /// Sets a fixed rendering.
    pub const fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }
}

/// One registration: a base plus the form it is encoded in.
#[derive(Debug, Clone, Copy)]
pub struct VariantDecl {
    /// Lookup key into the layout table.
    pub key: &'static str,
    pub base: &'static VariantBase,
    pub form: ShortForm,
    /// Text rendered for commands without operands.
    pub description: &'static str,
}

impl VariantDecl {
    pub const fn long(
        key: &'static str,
        base: &'static VariantBase,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            base,
            form: ShortForm::Long,
            description,
        }
    }

    pub const fn short(
        key: &'static str,
        base: &'static VariantBase,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            base,
            form: ShortForm::Short,
            description,
        }
    }

    pub const fn either(
        key: &'static str,
        base: &'static VariantBase,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            base,
            form: ShortForm::Either,
            description,
        }
    }
}

/// A registered variant with its layout resolved.
pub struct VariantDescriptor {
    pub(crate) decl: VariantDecl,
    pub(crate) layout: FieldLayout,
    pub(crate) converter: Option<Arc<dyn Converter>>,
}

impl VariantDescriptor {
    pub(crate) fn new(
        decl: VariantDecl,
        layout: FieldLayout,
        converter: Option<Arc<dyn Converter>>,
    ) -> Self {
        Self {
            decl,
            layout,
            converter,
        }
    }

    pub fn key(&self) -> &'static str {
        self.decl.key
    }

    pub fn engine(&self) -> Engine {
        self.decl.base.engine
    }

    pub fn opcode(&self) -> u64 {
        self.decl.base.opcode
    }

    pub fn form(&self) -> ShortForm {
        self.decl.form
    }

    pub fn discriminants(&self) -> &Discriminants {
        &self.decl.base.discriminants
    }

    pub fn description(&self) -> &'static str {
        self.decl.description
    }

    pub fn alias(&self) -> Option<&'static str> {
        self.decl.base.alias
    }

    pub fn base(&self) -> &'static VariantBase {
        self.decl.base
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    /// Encoded length in bits.
    pub fn len_bits(&self) -> usize {
        self.layout.len_bits()
    }

    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }

    /// Op name for a decoded discriminant: the table entry if there is one,
    /// else the fixed op name, else the description.
    pub fn op_name(&self, discriminant: Option<u64>) -> &'static str {
        let base = self.decl.base;
        discriminant
            .and_then(|code| base.discriminants.name_of(code))
            .or(base.op_name)
            .unwrap_or(self.decl.description)
    }

    /// Returns true if the predicate accepts a word with these classifier values.
    pub(crate) fn admits(&self, short: bool, opcode: u64, discriminant: u64) -> bool {
        self.form().admits(short)
            && opcode == self.opcode()
            && self.discriminants().contains(discriminant)
    }

    /// The classifier predicate.
    ///
    /// Checked in order, stopping at the first failure: the word is at
    /// least as long as the encoding; the short-form bit matches, unless the
    /// variant takes either form; the opcode matches; the discriminant is in
    /// the variant's set, unless the set is `Any`.
    pub fn accepts(&self, word: &BitSlice<'_>) -> bool {
        if word.len() < self.len_bits() {
            return false;
        }
        self.accepts_prefix(word)
    }

    /// The predicate without the length check; bits beyond the end of the
    /// word are treated as matching. Used to tell a truncated command from
    /// an unrecognized one.
    pub(crate) fn accepts_prefix(&self, word: &BitSlice<'_>) -> bool {
        let engine = self.engine();
        if let Some(expected) = self.form().expected() {
            match word.bit(engine.short_form_bit()) {
                Some(bit) if bit != expected => return false,
                _ => {}
            }
        }
        match word.field(engine.opcode_bits()) {
            Ok(opcode) if opcode != self.opcode() => return false,
            _ => {}
        }
        if !self.discriminants().is_any() {
            match word.field(engine.discriminant_bits()) {
                Ok(code) if !self.discriminants().contains(code) => return false,
                _ => {}
            }
        }
        true
    }
}

impl fmt::Debug for VariantDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantDescriptor")
            .field("key", &self.key())
            .field("engine", &self.engine())
            .field("opcode", &self.opcode())
            .field("form", &self.form())
            .field("len_bits", &self.len_bits())
            .field("has_converter", &self.has_converter())
            .finish()
    }
}
