//! Loose JSON Schema derived from the attribute definitions.
//!
//! Every declared attribute may be a string, a number, or an array of strings,
//! so the model can emit whichever shape the document supports. Enum-constrained
//! attributes are narrowed to "one allowed value (or empty)" or "array of
//! allowed values". The schema is rebuilt on every extraction call; it is a
//! pure function of the definition set.

use crate::definition::AttributeDefinitionSet;
use serde_json::{json, Map, Value};

/// Schema name used when the schema is attached as a structured-output format.
pub const LOOSE_SCHEMA_NAME: &str = "DocAttributes";

#[derive(Debug, Clone, PartialEq)]
pub struct LooseSchema(Value);

impl LooseSchema {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Property schema for one attribute, if declared.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.0.get("properties")?.get(name)
    }

    pub fn property_count(&self) -> usize {
        self.0
            .get("properties")
            .and_then(Value::as_object)
            .map_or(0, Map::len)
    }

    pub fn to_pretty_string(&self) -> String {
        // Serializing a `Value` cannot fail.
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }

    /// `text.format` wrapper for strict structured output.
    pub fn text_format(&self) -> Value {
        json!({
            "type": "json_schema",
            "name": LOOSE_SCHEMA_NAME,
            "schema": self.0,
            "strict": true
        })
    }
}

fn loose_property() -> Value {
    json!({
        "anyOf": [
            { "type": "string" },
            { "type": "number" },
            { "type": "array", "items": { "type": "string" } }
        ]
    })
}

fn enum_property(values: &[String]) -> Value {
    let mut scalar: Vec<Value> = values.iter().map(|v| json!(v)).collect();
    scalar.push(json!(""));
    json!({
        "anyOf": [
            { "type": "string", "enum": scalar },
            { "type": "array", "items": { "type": "string", "enum": values } }
        ]
    })
}

pub fn build_loose_schema(defs: &AttributeDefinitionSet) -> LooseSchema {
    let mut properties = Map::new();
    for name in defs.names() {
        let property = match defs.enum_values(name) {
            Some(values) => enum_property(values),
            None => loose_property(),
        };
        properties.insert(name.to_string(), property);
    }

    LooseSchema(json!({
        "title": LOOSE_SCHEMA_NAME,
        "type": "object",
        "properties": properties,
        "additionalProperties": false
    }))
}
