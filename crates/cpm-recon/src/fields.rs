//! Lenient field access over backend JSON
//!
//! The backend spells the same field several ways and mixes numbers with
//! numeric strings. These helpers accept every observed spelling.

use serde_json::{Map, Value};

/// Property names under which listings wrap their payload
pub(crate) const WRAPPER_KEYS: [&str; 3] = ["tasks", "data", "items"];

/// First present, non-null value among `keys`
pub(crate) fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Identifier as text: strings are trimmed, integers printed
pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Number or numeric string
pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Non-empty trimmed string
pub(crate) fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Array stored under one of the wrapper keys
pub(crate) fn wrapped_array(obj: &Map<String, Value>) -> Option<&Vec<Value>> {
    WRAPPER_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_array))
}
