//! The (results, attributes, operands) triple attached to a decoded command.
//!
//! The decoder never computes these itself; a per-variant converter turns
//! the raw field map into named, typed values.

use std::fmt;

use indexmap::IndexMap;

/// A named, typed value: either an operand read or a result written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Value {
    /// Display name, e.g. `%R0.2048`.
    pub name: String,
    /// Type text, e.g. `memref<1x32x28x28xf32>`.
    pub ty: String,
}

impl Value {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Named attributes in insertion order.
///
/// Renders as `{name = value, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Attributes {
    entries: IndexMap<String, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, replacing any earlier value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.entries.insert(name.into(), value.to_string());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} = {}", name, value)?;
        }
        f.write_str("}")
    }
}

/// Results, attributes and operands of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Semantics {
    pub results: Vec<Value>,
    pub attributes: Attributes,
    pub operands: Vec<Value>,
}

impl Semantics {
    pub fn new(results: Vec<Value>, attributes: Attributes, operands: Vec<Value>) -> Self {
        Self {
            results,
            attributes,
            operands,
        }
    }

    /// Adds a result.
    pub fn with_result(mut self, value: Value) -> Self {
        self.results.push(value);
        self
    }

    /// Adds an operand.
    pub fn with_operand(mut self, value: Value) -> Self {
        self.operands.push(value);
        self
    }

    /// Sets the attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns true if no converter contributed anything.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.attributes.is_empty() && self.operands.is_empty()
    }
}
