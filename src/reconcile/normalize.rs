use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// Canonical form used to compare local and remote attributes.
///
/// Objects become sorted maps with blank entries removed, numbers become their decimal
/// string (integral floats without a fraction) and arrays keep their order. Two values
/// that differ only in key order or in number-versus-string representation normalize
/// to the same value.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let normalized: Map<String, Value> = keys
                .into_iter()
                .map(|key| (key.clone(), normalize(&map[key])))
                .filter(|(_, value)| !is_blank(value))
                .collect();
            Value::Object(normalized)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Number(number) => Value::String(number_string(number)),
        other => other.clone(),
    }
}

fn number_string(number: &serde_json::Number) -> String {
    if let Some(integer) = number.as_i64() {
        return integer.to_string();
    }
    if let Some(integer) = number.as_u64() {
        return integer.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < i64::MAX as f64 => {
            (float as i64).to_string()
        }
        _ => number.to_string(),
    }
}

/// `null`, `""`, `[]`, `{}` and `false`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

/// Keys whose normalized values differ between the two attribute sets.
///
/// Compares the union of keys. A key missing on one side equals a blank value on the
/// other. The remote-only `id` is ignored.
pub fn differing_keys(local: &Map<String, Value>, remote: &Map<String, Value>) -> Vec<String> {
    let keys: BTreeSet<&String> = local.keys().chain(remote.keys()).collect();

    keys.into_iter()
        .filter(|key| key.as_str() != "id")
        .filter(|key| comparable(local.get(*key)) != comparable(remote.get(*key)))
        .cloned()
        .collect()
}

fn comparable(value: Option<&Value>) -> Value {
    value
        .map(normalize)
        .filter(|value| !is_blank(value))
        .unwrap_or(Value::Null)
}
