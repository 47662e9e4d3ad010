//! Cart literal extraction.
//!
//! The cart is whatever nested order state the caller carries, handed over
//! as a [`serde_json::Value`]. The walker knows nothing about the schema;
//! it just collects string leaves for the query matcher.

use std::collections::HashSet;

use serde_json::Value;

/// Collect every string value in `value`, at any depth, depth-first in
/// key/index order. Each distinct string appears once, in first-encounter
/// order. Keys themselves are not collected, only values.
pub fn collect_strings(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    walk(value, &mut out, &mut seen);
    out
}

fn walk(value: &Value, out: &mut Vec<String>, seen: &mut HashSet<String>) {
    match value {
        Value::String(text) => {
            if seen.insert(text.clone()) {
                out.push(text.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, out, seen);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                walk(item, out, seen);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collects_nested_strings() {
        let cart = json!({
            "items": [
                {"name": "Wiseguy", "options": [{"name": "Cheese", "amount": "Regular"}]},
                {"name": "Coca-Cola", "size": "Medium"}
            ]
        });
        let literals = collect_strings(&cart);
        for expected in ["Wiseguy", "Cheese", "Regular", "Coca-Cola", "Medium"] {
            assert!(literals.iter().any(|l| l == expected), "missing {}", expected);
        }
        assert_eq!(literals.len(), 5);
    }

    #[test]
    fn test_deduplicates_in_first_encounter_order() {
        let cart = json!(["Fries", "Sprite", "Fries", "Sprite", "Fries"]);
        assert_eq!(collect_strings(&cart), ["Fries", "Sprite"]);
    }

    #[test]
    fn test_ignores_non_string_leaves() {
        let cart = json!({"count": 2, "paid": false, "note": null, "tags": [1, 2.5]});
        assert!(collect_strings(&cart).is_empty());
    }

    #[test]
    fn test_keys_are_not_collected() {
        let cart = json!({"Wiseguy": 1});
        assert!(collect_strings(&cart).is_empty());
    }

    #[test]
    fn test_scalar_string_value() {
        assert_eq!(collect_strings(&json!("Sprite")), ["Sprite"]);
    }
}
