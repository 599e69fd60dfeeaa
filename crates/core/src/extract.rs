//! Dotted-path field extraction over deserialized step records.

use serde_json::Value;

use crate::types::StepRecord;

/// Keys tried, in order, to reduce a mapping element to a single string.
pub const LABEL_KEYS: &[&str] = &["name", "statement", "label", "title"];

/// Resolve `path` against `record` into a flat, ordered list of strings.
///
/// Each segment is looked up as a key when the current value is a mapping,
/// and pulled from every mapping element when it is a sequence (elements
/// lacking the key contribute nothing). At the end, string elements are kept
/// as-is and mapping elements are reduced through [`LABEL_KEYS`]. An
/// unresolvable path yields an empty list.
pub fn extract_items(record: &StepRecord, path: &str) -> Vec<String> {
    let mut segments = path.split('.').filter(|s| !s.is_empty());

    let Some(first) = segments.next() else {
        return Vec::new();
    };
    let Some(mut current) = record.get(first).cloned() else {
        return Vec::new();
    };

    for segment in segments {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(v) => v.clone(),
                None => return Vec::new(),
            },
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .filter_map(|item| item.as_object().and_then(|m| m.get(segment)).cloned())
                    .collect(),
            ),
            _ => return Vec::new(),
        };
    }

    match current {
        Value::Array(items) => items.iter().filter_map(leaf_label).collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    }
}

/// Reduce one terminal element to its display string.
fn leaf_label(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => LABEL_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .map(scalar_text),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
