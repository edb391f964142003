//! Attribute Definition Set
//!
//! The declared attribute names (ordered) plus the enum map restricting a
//! subset of them. Loaded once and read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Attribute configuration shipped with the crate.
pub const DEFAULT_ATTRIBUTE_CONFIG: &str = include_str!("../attributes.json");

#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("attribute names must be non-empty")]
    EmptyName,
    #[error("attribute `{0}` is declared more than once")]
    DuplicateAttribute(String),
    #[error("enum constraint on `{0}`, which is not a declared attribute")]
    UnknownEnumAttribute(String),
    #[error("enum for `{attribute}` lists `{value}` more than once")]
    DuplicateEnumValue { attribute: String, value: String },
    #[error("failed to read attribute config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid attribute config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk shape: `{"attributes": [...], "enums": {"name": [...]}}`.
#[derive(Debug, Clone, Default, Deserialize)]
struct AttributeConfigFile {
    #[serde(default)]
    attributes: Vec<String>,
    #[serde(default)]
    enums: Option<BTreeMap<String, Vec<String>>>,
}

/// Declared attribute names and their optional enum constraints.
///
/// Invariants (checked at construction):
/// - names are non-empty and unique, and keep their declared order,
/// - every enum-constrained name is a declared attribute,
/// - enum values are unique per attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AttributeConfigFile")]
pub struct AttributeDefinitionSet {
    attributes: Vec<String>,
    enums: BTreeMap<String, Vec<String>>,
}

impl TryFrom<AttributeConfigFile> for AttributeDefinitionSet {
    type Error = DefinitionError;

    fn try_from(file: AttributeConfigFile) -> Result<Self, Self::Error> {
        Self::new(file.attributes, file.enums.unwrap_or_default())
    }
}

impl AttributeDefinitionSet {
    pub fn new(
        attributes: Vec<String>,
        enums: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, DefinitionError> {
        let mut seen = BTreeSet::new();
        for name in &attributes {
            if name.trim().is_empty() {
                return Err(DefinitionError::EmptyName);
            }
            if !seen.insert(name.as_str()) {
                return Err(DefinitionError::DuplicateAttribute(name.clone()));
            }
        }

        for (attribute, values) in &enums {
            if !seen.contains(attribute.as_str()) {
                return Err(DefinitionError::UnknownEnumAttribute(attribute.clone()));
            }
            let mut distinct = BTreeSet::new();
            for value in values {
                if !distinct.insert(value.as_str()) {
                    return Err(DefinitionError::DuplicateEnumValue {
                        attribute: attribute.clone(),
                        value: value.clone(),
                    });
                }
            }
        }

        Ok(Self { attributes, enums })
    }

    pub fn from_json_str(text: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let text = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// The built-in hospitality attribute set.
    pub fn builtin() -> Result<Self, DefinitionError> {
        Self::from_json_str(DEFAULT_ATTRIBUTE_CONFIG)
    }

    /// Declared names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    pub fn enum_values(&self, name: &str) -> Option<&[String]> {
        self.enums.get(name).map(Vec::as_slice)
    }

    /// Enum-constrained attributes, sorted by name.
    pub fn enums(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.enums.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn has_enums(&self) -> bool {
        !self.enums.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builtin_config_is_valid() {
        let defs = AttributeDefinitionSet::builtin().unwrap();
        assert!(defs.contains("title"));
        assert!(defs.contains("travel_types"));
        assert!(defs.enum_values("travel_types").unwrap().contains(&"leisure".to_string()));
    }

    #[test]
    fn preserves_declaration_order() {
        let defs = AttributeDefinitionSet::new(names(&["year", "title", "company"]), BTreeMap::new())
            .unwrap();
        assert_eq!(defs.names().collect::<Vec<_>>(), vec!["year", "title", "company"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = AttributeDefinitionSet::new(names(&["title", "title"]), BTreeMap::new()).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateAttribute(n) if n == "title"));
    }

    #[test]
    fn rejects_enum_for_undeclared_attribute() {
        let mut enums = BTreeMap::new();
        enums.insert("region".to_string(), names(&["east"]));
        let err = AttributeDefinitionSet::new(names(&["title"]), enums).unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownEnumAttribute(n) if n == "region"));
    }

    #[test]
    fn rejects_duplicate_enum_values() {
        let mut enums = BTreeMap::new();
        enums.insert("tier".to_string(), names(&["luxury", "luxury"]));
        let err = AttributeDefinitionSet::new(names(&["tier"]), enums).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateEnumValue { .. }));
    }

    #[test]
    fn null_enums_are_treated_as_empty() {
        let defs = AttributeDefinitionSet::from_json_str(r#"{"attributes": ["title"], "enums": null}"#)
            .unwrap();
        assert!(!defs.has_enums());
        assert_eq!(defs.len(), 1);
    }

    #[test]
    fn invalid_config_is_an_error_not_a_panic() {
        let err = AttributeDefinitionSet::from_json_str(r#"{"attributes": ["", "x"]}"#).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }
}
