//! Field-by-field reading of model answers.
//!
//! A model answer is read as a `serde_json::Value` and each field is pulled
//! out on its own. A field that is missing or has the wrong type takes its
//! empty value without affecting its siblings.

use serde_json::Value;

use crate::generation::types::{BulletPoint, DesignConcept, ScriptSection};

/// String field, or `None` when absent or not a string.
pub(crate) fn opt_text(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

/// String field, or an empty string.
pub(crate) fn text(value: &Value, key: &str) -> String {
    opt_text(value, key).unwrap_or_default()
}

/// List of strings. Non-string entries are skipped; a single string is
/// split on commas.
pub(crate) fn text_list(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Some(Value::String(joined)) => joined.split(',').map(String::from).collect(),
        _ => Vec::new(),
    }
}

/// Array field mapped entry by entry, or `None` when absent or not an array.
pub(crate) fn opt_list<T>(value: &Value, key: &str, item: impl Fn(&Value) -> T) -> Option<Vec<T>> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(item).collect())
}

/// One script section. A bare string is taken as its content.
pub(crate) fn section(value: &Value) -> ScriptSection {
    if let Some(content) = value.as_str() {
        return ScriptSection::new("", content);
    }
    ScriptSection {
        title: text(value, "title"),
        content: text(value, "content"),
        duration_label: opt_text(value, "durationLabel").or_else(|| opt_text(value, "duration")),
    }
}

pub(crate) fn design_concept(value: &Value) -> DesignConcept {
    DesignConcept {
        name: text(value, "name"),
        description: text(value, "description"),
    }
}

pub(crate) fn bullet_point(value: &Value) -> BulletPoint {
    BulletPoint {
        title: text(value, "title"),
        sub_points: text_list(value, "subPoints"),
    }
}
