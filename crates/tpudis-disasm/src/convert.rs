//! Per-variant semantic converters.
//!
//! A converter turns a decoded [`FieldMap`] into the results, attributes
//! and operands of the command. Converters are supplied by the caller,
//! keyed by variant key; variants without one decode with an empty
//! [`Semantics`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tpudis_core::{Attributes, FieldMap, Semantics};

/// Builds the semantic triple for one variant.
pub trait Converter: Send + Sync {
    fn convert(&self, fields: &FieldMap) -> Semantics;
}

impl<F> Converter for F
where
    F: Fn(&FieldMap) -> Semantics + Send + Sync,
{
    fn convert(&self, fields: &FieldMap) -> Semantics {
        self(fields)
    }
}

/// Converters keyed by variant key.
#[derive(Clone, Default)]
pub struct ConverterTable {
    converters: HashMap<String, Arc<dyn Converter>>,
}

impl ConverterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter, replacing any earlier one for the key.
    pub fn insert(&mut self, key: impl Into<String>, converter: impl Converter + 'static) {
        self.converters.insert(key.into(), Arc::new(converter));
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, converter: impl Converter + 'static) -> Self {
        self.insert(key, converter);
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Converter>> {
        self.converters.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for ConverterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.converters.keys().collect();
        keys.sort();
        f.debug_struct("ConverterTable").field("keys", &keys).finish()
    }
}

/// Where an attribute takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrSource {
    /// A single field.
    Field(&'static str),
    /// Several fields, rendered as a list.
    Fields(&'static [&'static str]),
}

/// Builds attributes from field values.
///
/// Each `(name, source)` pair becomes one attribute; list sources render as
/// `[a, b, c]`. Fields absent from the map are skipped, so one spec can be
/// shared between long and short encodings.
///
/// # Example
/// ```
/// use tpudis_core::FieldMap;
/// use tpudis_disasm::convert::{build_attributes, AttrSource};
///
/// let fields: FieldMap = [("opt_rq", 1), ("kh", 3), ("kw", 3)].into_iter().collect();
/// let attrs = build_attributes(
///     &fields,
///     &[("rq", AttrSource::Field("opt_rq")), ("kernel", AttrSource::Fields(&["kh", "kw"]))],
/// );
/// assert_eq!(attrs.to_string(), "{rq = 1, kernel = [3, 3]}");
/// ```
pub fn build_attributes(fields: &FieldMap, spec: &[(&str, AttrSource)]) -> Attributes {
    let mut attrs = Attributes::new();
    for (name, source) in spec {
        match source {
            AttrSource::Field(field) => {
                if let Some(value) = fields.get(field) {
                    attrs.insert(*name, value);
                }
            }
            AttrSource::Fields(list) => {
                let values: Option<Vec<String>> = list
                    .iter()
                    .map(|field| fields.get(field).map(|v| v.to_string()))
                    .collect();
                if let Some(values) = values {
                    attrs.insert(*name, format!("[{}]", values.join(", ")));
                }
            }
        }
    }
    attrs
}
