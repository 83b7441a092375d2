//! Field layouts: how a variant's word is partitioned into named fields.
//!
//! Layouts are static data produced from the hardware register tables. Each
//! layout is an ordered list of `(name, end)` pairs where `end` is the
//! exclusive bit offset at which the field stops; a field starts where the
//! previous one ended, and the first starts at bit 0.
//!
//! On disk a table is a JSON object keyed by variant key:
//!
//! ```json
//! { "CONV": [["cmd_short", 1], ["cmd_id", 21], ["cmd_id_dep", 41]] }
//! ```

use std::collections::HashMap;
use std::ops::Range;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tpudis_core::{MAX_FIELD_BITS, REQUIRED_FIELDS};

use crate::RegistryError;

/// One named field and the bit offset where it ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, usize)", into = "(String, usize)")]
pub struct FieldSpec {
    pub name: String,
    pub end: usize,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, end: usize) -> Self {
        Self {
            name: name.into(),
            end,
        }
    }
}

impl From<(String, usize)> for FieldSpec {
    fn from((name, end): (String, usize)) -> Self {
        Self { name, end }
    }
}

impl From<FieldSpec> for (String, usize) {
    fn from(spec: FieldSpec) -> Self {
        (spec.name, spec.end)
    }
}

/// Ordered field boundaries for one variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldLayout {
    fields: Vec<FieldSpec>,
}

impl FieldLayout {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Declared length of the encoding: the last boundary.
    pub fn len_bits(&self) -> usize {
        self.fields.last().map_or(0, |f| f.end)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Iterates `(name, bit range)` for every field in declaration order.
    pub fn ranges(&self) -> impl Iterator<Item = (&str, Range<usize>)> + '_ {
        let starts = std::iter::once(0).chain(self.fields.iter().map(|f| f.end));
        self.fields
            .iter()
            .zip(starts)
            .map(|(field, start)| (field.name.as_str(), start..field.end))
    }

    /// Bit range of a named field.
    pub fn range_of(&self, name: &str) -> Option<Range<usize>> {
        self.ranges()
            .find(|(field, _)| *field == name)
            .map(|(_, range)| range)
    }

    /// Checks the layout is usable for decoding.
    ///
    /// Boundaries must strictly increase from a non-zero first field, no
    /// field may exceed 64 bits, names must be unique, and the required
    /// `cmd_id`/`cmd_id_dep` fields must be present.
    pub fn validate(&self, key: &str) -> Result<(), RegistryError> {
        if self.fields.is_empty() {
            return Err(RegistryError::invalid_layout(key, "layout has no fields"));
        }

        let mut seen = std::collections::HashSet::with_capacity(self.fields.len());
        for (name, range) in self.ranges() {
            if range.end <= range.start {
                return Err(RegistryError::invalid_layout(
                    key,
                    format!(
                        "boundary of `{}` ({}) does not follow previous boundary ({})",
                        name, range.end, range.start
                    ),
                ));
            }
            let width = range.end - range.start;
            if width > MAX_FIELD_BITS {
                return Err(RegistryError::FieldTooWide {
                    key: key.to_string(),
                    field: name.to_string(),
                    width,
                });
            }
            if !seen.insert(name) {
                return Err(RegistryError::invalid_layout(
                    key,
                    format!("field `{}` declared more than once", name),
                ));
            }
        }

        for required in REQUIRED_FIELDS {
            if !seen.contains(required) {
                return Err(RegistryError::missing_field(key, required));
            }
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for FieldLayout {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, end)| FieldSpec::new(name, end))
                .collect(),
        }
    }
}

/// Keyed lookup of field layouts, consumed once at registry build time.
pub trait LayoutSource {
    /// Returns the layout registered under `key`.
    fn layout(&self, key: &str) -> Option<&FieldLayout>;
}

/// An in-memory layout table. Keys keep their insertion (or JSON) order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutTable {
    layouts: IndexMap<String, FieldLayout>,
}

impl LayoutTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a layout.
    pub fn insert(&mut self, key: impl Into<String>, layout: FieldLayout) {
        self.layouts.insert(key.into(), layout);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, layout: FieldLayout) -> Self {
        self.insert(key, layout);
        self
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Iterates the registered keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    /// Load a table from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save the table to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl LayoutSource for LayoutTable {
    fn layout(&self, key: &str) -> Option<&FieldLayout> {
        self.layouts.get(key)
    }
}

impl LayoutSource for HashMap<String, FieldLayout> {
    fn layout(&self, key: &str) -> Option<&FieldLayout> {
        self.get(key)
    }
}
