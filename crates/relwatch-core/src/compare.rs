//! Deep equality between resolved field values.
//!
//! Semantics:
//! - absent and `null` are equal to each other and to nothing else
//! - numbers compare by exact value (`10 == 10.0`); integers are never
//!   rounded through `f64`
//! - arrays compare as multisets: element order is ignored
//! - objects compare over the union of their keys, a missing key equals `null`

use crate::path::Resolved;
use serde_json::{Map, Number, Value};

/// Compare the old and new value resolved at the same path.
pub fn resolved_equal(old: Resolved<'_>, new: Resolved<'_>) -> bool {
    if old.is_nullish() && new.is_nullish() {
        return true;
    }
    match (old.value(), new.value()) {
        (Some(a), Some(b)) => values_equal(a, b),
        _ => false,
    }
}

/// Structural equality of two JSON values.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => arrays_equal(x, y),
        (Value::Object(x), Value::Object(y)) => objects_equal(x, y),
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    match (integral_value(a), integral_value(b)) {
        (Some(x), Some(y)) => x == y,
        (None, None) => a.as_f64() == b.as_f64(),
        _ => false,
    }
}

/// Exact integer value of `n`: every integer, and every whole float
/// below 2^127 in magnitude.
fn integral_value(n: &Number) -> Option<i128> {
    if let Some(i) = n.as_i64() {
        return Some(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Some(u.into());
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f.abs() < i128::MAX as f64 {
        Some(f as i128)
    } else {
        None
    }
}

fn arrays_equal(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    sorted_projections(a) == sorted_projections(b)
}

fn objects_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.keys()
        .chain(b.keys())
        .all(|key| resolved_equal(member(a, key), member(b, key)))
}

fn member<'a>(map: &'a Map<String, Value>, key: &str) -> Resolved<'a> {
    match map.get(key) {
        Some(value) => Resolved::Present(value),
        None => Resolved::Absent,
    }
}

fn sorted_projections(items: &[Value]) -> Vec<String> {
    let mut projected: Vec<String> = items.iter().map(canonical_projection).collect();
    projected.sort();
    projected
}

/// Stable string projection used to normalise array order.
///
/// Object keys are sorted and `null` members dropped, nested arrays are
/// normalised recursively and integral numbers print without a fraction, so
/// two values that are [`values_equal`] always project to the same string.
pub fn canonical_projection(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => canonical_number(n),
        Value::String(_) => value.to_string(),
        Value::Array(items) => format!("[{}]", sorted_projections(items).join(",")),
        Value::Object(map) => {
            let mut members: Vec<(&String, &Value)> =
                map.iter().filter(|(_, v)| !v.is_null()).collect();
            members.sort_by(|x, y| x.0.cmp(y.0));
            let body: Vec<String> = members
                .into_iter()
                .map(|(k, v)| {
                    format!(
                        "{}:{}",
                        Value::String(k.clone()),
                        canonical_projection(v)
                    )
                })
                .collect();
            format!("{{{}}}", body.join(","))
        }
    }
}

fn canonical_number(n: &Number) -> String {
    match integral_value(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}
