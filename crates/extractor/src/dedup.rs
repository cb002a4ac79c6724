use serde_json::Value;
use std::collections::HashSet;

/// Textual form of a value with object keys sorted at every depth.
///
/// Two values compare equal for deduplication iff their canonical forms match,
/// regardless of the key order they were written in.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (idx, (key, inner)) in entries.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(inner, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, inner) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(inner, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Unique JSON values in discovery order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoundSet {
    values: Vec<Value>,
}

impl FoundSet {
    /// Deduplicate candidates by canonical form, keeping first occurrences.
    pub fn from_candidates(candidates: impl IntoIterator<Item = Value>) -> Self {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        let mut dropped = 0usize;
        for value in candidates {
            if seen.insert(canonical_json(&value)) {
                values.push(value);
            } else {
                dropped += 1;
            }
        }
        log::debug!(
            "dedup kept {} unique values, dropped {dropped} repeats",
            values.len()
        );
        Self { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Only the JSON objects, in discovery order.
    pub fn objects(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|value| value.is_object())
    }

    /// First `limit` values
    #[must_use]
    pub fn sample(&self, limit: usize) -> Vec<Value> {
        self.values.iter().take(limit).cloned().collect()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }
}

impl<'a> IntoIterator for &'a FoundSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn canonical_form_ignores_key_order() {
        let a: Value =
            serde_json::from_str(r#"{"b":1,"a":{"y":[1,{"q":2,"p":1}],"x":null}}"#).unwrap();
        let b: Value =
            serde_json::from_str(r#"{"a":{"x":null,"y":[1,{"p":1,"q":2}]},"b":1}"#).unwrap();
        assert_eq!(canonical_json(&a), canonical_json(&b));
        assert_eq!(
            canonical_json(&a),
            r#"{"a":{"x":null,"y":[1,{"p":1,"q":2}]},"b":1}"#
        );
    }

    #[test]
    fn canonical_form_keeps_array_order_and_number_shape() {
        assert_ne!(canonical_json(&json!([1, 2])), canonical_json(&json!([2, 1])));
        assert_ne!(canonical_json(&json!(1)), canonical_json(&json!(1.0)));
    }

    #[test]
    fn found_set_keeps_first_occurrence_order() {
        let first: Value = serde_json::from_str(r#"{"k":1,"j":2}"#).unwrap();
        let same: Value = serde_json::from_str(r#"{"j":2,"k":1}"#).unwrap();
        let set = FoundSet::from_candidates(vec![
            first.clone(),
            json!([1]),
            same,
            json!("x"),
            json!([1]),
        ]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.as_slice(), &[first, json!([1]), json!("x")]);
        // the surviving instance still has its original key order
        assert_eq!(set.as_slice()[0].to_string(), r#"{"k":1,"j":2}"#);
        assert_eq!(set.objects().count(), 1);
        assert_eq!(set.sample(2).len(), 2);
    }
}
