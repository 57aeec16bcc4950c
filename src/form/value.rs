use std::collections::{BTreeMap, BTreeSet};

pub use serde_json::Value as FieldValue;
use serde_json::Number;

pub type ValueMap = BTreeMap<String, FieldValue>;

/// Builds a [`ValueMap`] from `(name, value)` pairs.
pub fn value_map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> ValueMap
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Truthiness of a possibly absent value: `null`, `false`, `0`, `""` and a
/// missing key are falsy, everything else (including empty arrays and objects)
/// is truthy.
pub fn is_truthy(value: Option<&FieldValue>) -> bool {
    match value {
        None | Some(FieldValue::Null) => false,
        Some(FieldValue::Bool(flag)) => *flag,
        Some(FieldValue::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(FieldValue::String(text)) => !text.is_empty(),
        Some(FieldValue::Array(_)) | Some(FieldValue::Object(_)) => true,
    }
}

pub fn is_empty_string(value: Option<&FieldValue>) -> bool {
    matches!(value, Some(FieldValue::String(text)) if text.is_empty())
}

pub fn is_zero(value: Option<&FieldValue>) -> bool {
    matches!(value, Some(FieldValue::Number(number)) if number.as_f64() == Some(0.0))
}

/// Content equality where numbers compare by numeric value, so `30` and
/// `30.0` are equal. Arrays and objects compare element by element.
pub fn values_equal(left: &FieldValue, right: &FieldValue) -> bool {
    match (left, right) {
        (FieldValue::Number(left), FieldValue::Number(right)) => numbers_equal(left, right),
        (FieldValue::Array(left), FieldValue::Array(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(left, right)| values_equal(left, right))
        }
        (FieldValue::Object(left), FieldValue::Object(right)) => {
            left.len() == right.len()
                && left.iter().all(|(key, value)| {
                    right
                        .get(key)
                        .is_some_and(|other| values_equal(value, other))
                })
        }
        (left, right) => left == right,
    }
}

pub fn maps_equal(left: &ValueMap, right: &ValueMap) -> bool {
    left.len() == right.len()
        && left.iter().all(|(key, value)| {
            right
                .get(key)
                .is_some_and(|other| values_equal(value, other))
        })
}

fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return left == right;
    }
    if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
        return left == right;
    }
    left.as_f64() == right.as_f64()
}

fn is_compound(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Array(_) | FieldValue::Object(_))
}

/// Field-level strict inequality against the baseline.
///
/// Scalars compare by value. Arrays and objects behave like references: they
/// stay equal to the baseline only until the key is written again, whatever
/// the written content is. `None` (absent) and `null` differ.
pub(super) fn strictly_differs(
    name: &str,
    value: Option<&FieldValue>,
    baseline: Option<&FieldValue>,
    written: &BTreeSet<String>,
) -> bool {
    match (value, baseline) {
        (None, None) => false,
        (Some(value), Some(baseline)) if is_compound(value) && is_compound(baseline) => {
            written.contains(name) || !values_equal(value, baseline)
        }
        (Some(value), Some(baseline)) => !values_equal(value, baseline),
        _ => true,
    }
}

/// Shallow merge: keys in `delta` overwrite, all other keys are kept.
/// Returns whether any entry actually changed.
pub(super) fn merge_into(values: &mut ValueMap, delta: ValueMap) -> bool {
    let mut changed = false;
    for (key, value) in delta {
        match values.get(&key) {
            Some(current) if values_equal(current, &value) => {}
            _ => changed = true,
        }
        values.insert(key, value);
    }
    changed
}
