//! Attribute Record: the canonical per-document attribute map.

use crate::definition::AttributeDefinitionSet;
use crate::TITLE_ATTRIBUTE;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// A single attribute value: empty string (unknown), a string, or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    List(Vec<String>),
}

impl Default for AttributeValue {
    fn default() -> Self {
        AttributeValue::Text(String::new())
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // Nested structures are kept as compact JSON rather than dropped.
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

impl AttributeValue {
    /// Coerce an arbitrary model value: null → `""`, numbers → their string
    /// form, arrays → per-element string forms.
    pub fn coerce(value: &Value) -> Self {
        match value {
            Value::Array(items) => AttributeValue::List(items.iter().map(scalar_text).collect()),
            other => AttributeValue::Text(scalar_text(other)),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            AttributeValue::Text(s) => s.trim().is_empty(),
            AttributeValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::List(_) => None,
        }
    }

    /// Non-empty values, whether scalar or list.
    pub fn values(&self) -> Vec<&str> {
        match self {
            AttributeValue::Text(s) if s.is_empty() => Vec::new(),
            AttributeValue::Text(s) => vec![s.as_str()],
            AttributeValue::List(items) => items
                .iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(items: Vec<String>) -> Self {
        AttributeValue::List(items)
    }
}

/// A value that is not one of the allowed enum values for its attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumViolation {
    pub attribute: String,
    pub value: String,
}

/// Attribute name → value, holding exactly the declared names once normalized.
///
/// Entries keep insertion order, so normalized records iterate and serialize
/// in the order the attributes were declared. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct AttributeRecord(Vec<(String, AttributeValue)>);

impl PartialEq for AttributeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for AttributeRecord {}

impl Serialize for AttributeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for AttributeRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = AttributeRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of attribute values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut record = AttributeRecord::default();
                while let Some((name, value)) = map.next_entry::<String, AttributeValue>()? {
                    record.set(name, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

impl AttributeRecord {
    /// Every declared attribute, defaulted to `""`.
    pub fn empty(defs: &AttributeDefinitionSet) -> Self {
        Self(
            defs.names()
                .map(|name| (name.to_string(), AttributeValue::default()))
                .collect(),
        )
    }

    /// Build the canonical record from a model-produced JSON object.
    ///
    /// Declared names missing from `raw` (or null) default to `""`; keys
    /// outside the declared set are dropped.
    pub fn normalize(defs: &AttributeDefinitionSet, raw: &Map<String, Value>) -> Self {
        Self(
            defs.names()
                .map(|name| {
                    let value = raw
                        .get(name)
                        .map(AttributeValue::coerce)
                        .unwrap_or_default();
                    (name.to_string(), value)
                })
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Replace the value in place, or append a new attribute at the end.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TITLE_ATTRIBUTE)
            .and_then(AttributeValue::as_text)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// True when the record has no attributes, or all of them are blank.
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|(_, v)| v.is_blank())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fill a blank `title` from the filename stem (underscores → spaces).
    ///
    /// Returns whether the title was changed. Records without a declared
    /// `title` attribute are left untouched.
    pub fn backfill_title(&mut self, filename_hint: &str) -> bool {
        let Some(current) = self.get(TITLE_ATTRIBUTE) else {
            return false;
        };
        if !current.is_blank() {
            return false;
        }
        let title = title_from_filename(filename_hint);
        if title.is_empty() {
            return false;
        }
        self.set(TITLE_ATTRIBUTE, AttributeValue::Text(title));
        true
    }

    /// Values of enum-constrained attributes outside their allowed set.
    ///
    /// Enum constraints are guidance for the model; callers log these rather
    /// than reject the record.
    pub fn enum_violations(&self, defs: &AttributeDefinitionSet) -> Vec<EnumViolation> {
        let mut out = Vec::new();
        for (attribute, allowed) in defs.enums() {
            let Some(value) = self.get(attribute) else {
                continue;
            };
            for v in value.values() {
                if !allowed.iter().any(|a| a == v) {
                    out.push(EnumViolation {
                        attribute: attribute.to_string(),
                        value: v.to_string(),
                    });
                }
            }
        }
        out
    }
}

/// `"reports/Q2_2025_Report.pdf"` → `"Q2 2025 Report"`.
pub fn title_from_filename(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " ").trim().to_string())
        .unwrap_or_default()
}
