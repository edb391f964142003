//! Property tests for schema derivation and record normalization.

use outlook_attrs::{build_loose_schema, AttributeDefinitionSet, AttributeRecord, AttributeValue};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

// ============================================================================
// Strategies
// ============================================================================

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,11}".prop_map(|s| s)
}

/// Definition sets with unique names and enums on a random subset of them.
fn definition_strategy() -> impl Strategy<Value = AttributeDefinitionSet> {
    prop::collection::btree_set(name_strategy(), 1..12)
        .prop_flat_map(|names| {
            let names: Vec<String> = names.into_iter().collect();
            let n = names.len();
            (
                Just(names),
                prop::collection::vec(any::<bool>(), n),
                prop::collection::vec(prop::collection::btree_set("[a-z]{1,8}", 1..5), n),
            )
        })
        .prop_map(|(names, constrained, values)| {
            let mut enums = BTreeMap::new();
            for ((name, is_enum), allowed) in names.iter().zip(constrained).zip(values) {
                if is_enum {
                    enums.insert(name.clone(), allowed.into_iter().collect::<Vec<_>>());
                }
            }
            AttributeDefinitionSet::new(names, enums).unwrap()
        })
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(|n| json!(n)),
        "[A-Za-z0-9 ]{0,12}".prop_map(|s| json!(s)),
    ]
}

fn element_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => scalar_strategy(),
        1 => prop::collection::vec(scalar_strategy(), 0..3).prop_map(Value::Array),
    ]
}

fn model_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        scalar_strategy(),
        prop::collection::vec(element_strategy(), 0..4).prop_map(Value::Array),
    ]
}

/// Expected string form of one list element.
fn element_text(item: &Value) -> String {
    match item {
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        nested => nested.to_string(),
    }
}

fn loose_union() -> Value {
    json!({
        "anyOf": [
            { "type": "string" },
            { "type": "number" },
            { "type": "array", "items": { "type": "string" } }
        ]
    })
}

// ============================================================================
// Schema properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn one_property_per_declared_name(defs in definition_strategy()) {
        let schema = build_loose_schema(&defs);
        prop_assert_eq!(schema.property_count(), defs.len());
        for name in defs.names() {
            prop_assert!(schema.property(name).is_some());
        }
    }

    #[test]
    fn enum_properties_never_use_the_generic_union(defs in definition_strategy()) {
        let schema = build_loose_schema(&defs);
        for (name, allowed) in defs.enums() {
            let prop = schema.property(name).unwrap();
            prop_assert_ne!(prop, &loose_union());

            let mut scalar: Vec<Value> = allowed.iter().map(|v| json!(v)).collect();
            scalar.push(json!(""));
            prop_assert_eq!(&prop["anyOf"][0]["enum"], &Value::Array(scalar));
            prop_assert_eq!(&prop["anyOf"][1]["items"]["enum"], &json!(allowed));
        }
        for name in defs.names().filter(|n| defs.enum_values(n).is_none()) {
            prop_assert_eq!(schema.property(name).unwrap(), &loose_union());
        }
    }

    #[test]
    fn schema_derivation_is_idempotent(defs in definition_strategy()) {
        prop_assert_eq!(build_loose_schema(&defs), build_loose_schema(&defs));
    }
}

// ============================================================================
// Normalization properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn normalized_records_hold_exactly_the_declared_keys(
        defs in definition_strategy(),
        raw in prop::collection::btree_map(name_strategy(), model_value_strategy(), 0..10),
    ) {
        let raw: Map<String, Value> = raw.into_iter().collect();
        let record = AttributeRecord::normalize(&defs, &raw);

        let declared: Vec<&str> = defs.names().collect();
        let keys: Vec<&str> = record.keys().collect();
        prop_assert_eq!(keys, declared);

        for (name, value) in record.iter() {
            match raw.get(name) {
                None | Some(Value::Null) => prop_assert_eq!(value, &AttributeValue::default()),
                Some(Value::Array(items)) => {
                    let AttributeValue::List(list) = value else {
                        return Err(TestCaseError::fail("array must stay a list"));
                    };
                    let expected: Vec<String> = items.iter().map(element_text).collect();
                    prop_assert_eq!(list, &expected);
                }
                Some(Value::Number(n)) => prop_assert_eq!(value, &AttributeValue::Text(n.to_string())),
                Some(Value::String(s)) => prop_assert_eq!(value, &AttributeValue::Text(s.clone())),
                Some(_) => {}
            }
        }
    }
}
