//! Small helpers for poking at loosely shaped `serde_json::Value`s.

use serde_json::Value;

/// Text form of a value for substring heuristics: strings are used as-is,
/// everything else is serialized compactly.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Lower-cased text of `obj[key]`, or an empty string when the key is absent.
pub(crate) fn field_text_lower(value: &Value, key: &str) -> String {
    value
        .get(key)
        .map(stringify)
        .unwrap_or_default()
        .to_lowercase()
}

pub(crate) fn has_key(value: &Value, key: &str) -> bool {
    value.as_object().is_some_and(|obj| obj.contains_key(key))
}

pub(crate) fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Entries of an array field, or nothing when the field is missing or not an array.
pub(crate) fn array_field(value: &Value, key: &str) -> Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stringify_keeps_strings_raw() {
        assert_eq!(stringify(&json!("Diagnostic: x")), "Diagnostic: x");
        assert_eq!(stringify(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn missing_field_is_empty_text() {
        let obj = json!({"@level": "ERROR"});
        assert_eq!(field_text_lower(&obj, "@level"), "error");
        assert_eq!(field_text_lower(&obj, "@message"), "");
    }
}
