//! Decoded field values keyed by field name.

use indexmap::IndexMap;

use crate::Error;

/// Field holding the command's sequence number within its own engine.
pub const CMD_ID: &str = "cmd_id";

/// Field holding the `cmd_id` of the other engine's command this one waits on.
pub const CMD_ID_DEP: &str = "cmd_id_dep";

/// Fields every layout must declare.
pub const REQUIRED_FIELDS: [&str; 2] = [CMD_ID, CMD_ID_DEP];

/// Field name to value, in layout declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldMap {
    values: IndexMap<String, u64>,
}

impl FieldMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts a field, returning the previous value if the name was present.
    pub fn insert(&mut self, name: impl Into<String>, value: u64) -> Option<u64> {
        self.values.insert(name.into(), value)
    }

    /// Looks up a field by exact name.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    /// Looks up a field the caller cannot do without.
    pub fn require(&self, name: &str) -> Result<u64, Error> {
        self.get(name)
            .ok_or_else(|| Error::MissingField(name.to_string()))
    }

    /// Returns true if the field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Iterates field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order() {
        let map: FieldMap = [("cmd_short", 0), ("cmd_id", 7), ("cmd_id_dep", 3)]
            .into_iter()
            .collect();
        let names: Vec<_> = map.names().collect();
        assert_eq!(names, ["cmd_short", "cmd_id", "cmd_id_dep"]);
    }

    #[test]
    fn lookup_is_exact() {
        let mut map = FieldMap::new();
        map.insert("des_cmd_id", 9);
        assert_eq!(map.get("des_cmd_id"), Some(9));
        assert_eq!(map.get(CMD_ID), None);
        assert_eq!(
            map.require(CMD_ID),
            Err(Error::MissingField("cmd_id".to_string()))
        );
    }

    #[test]
    fn insert_replaces() {
        let mut map = FieldMap::with_capacity(1);
        assert_eq!(map.insert("a", 1), None);
        assert_eq!(map.insert("a", 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.require("a"), Ok(2));
    }
}
