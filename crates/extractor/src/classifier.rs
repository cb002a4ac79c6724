use crate::config::ExtractorConfig;
use crate::json::{field_text_lower, has_key};
use crate::scanner::{split_lines, FragmentScanner};
use crate::types::PlanClassification;
use serde_json::Value;

/// Keys that mark an object found by scanning as a plan
const PLAN_SIGNAL_KEYS: [&str; 4] = [
    "resource_changes",
    "planned_values",
    "terraform_version",
    "format_version",
];

/// Decides what a text buffer contains
#[derive(Debug, Clone)]
pub struct PlanClassifier {
    scanner: FragmentScanner,
}

impl PlanClassifier {
    #[must_use]
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            scanner: FragmentScanner::new(config),
        }
    }

    /// Classify a buffer. Always returns exactly one outcome; `NotFound` is a
    /// value here and only becomes an error at the composer.
    #[must_use]
    pub fn classify(&self, text: &str) -> PlanClassification {
        if let Some(found) = classify_whole_buffer(text) {
            log::debug!("whole buffer parsed as {}", found.label());
            return found;
        }

        let objects = self.scanner.scan(text);
        log::debug!("scanner found {} unique values", objects.len());

        let mut diagnostics = Vec::new();
        for obj in objects.objects() {
            if PLAN_SIGNAL_KEYS.iter().any(|key| has_key(obj, key)) {
                let plan = PlanClassification::from_plan_object(obj.clone());
                log::debug!("first plan-shaped fragment classified as {}", plan.label());
                return plan;
            }
            if is_diagnostic_fragment(obj) {
                diagnostics.push(obj.clone());
            }
        }
        if !diagnostics.is_empty() {
            log::debug!("collected {} diagnostic fragments", diagnostics.len());
            return PlanClassification::Diagnostics {
                entries: diagnostics,
            };
        }

        let line_diagnostics = diagnostic_lines(text);
        if !line_diagnostics.is_empty() {
            log::debug!("line scan found {} diagnostics", line_diagnostics.len());
            return PlanClassification::Diagnostics {
                entries: line_diagnostics,
            };
        }

        if !objects.is_empty() {
            let message = format!(
                "Found {} JSON objects, but no Terraform plan was detected",
                objects.len()
            );
            return PlanClassification::UnclassifiedObjects { objects, message };
        }

        PlanClassification::NotFound {
            objects_scanned: objects.len(),
            diagnostics_scanned: line_diagnostics.len(),
        }
    }
}

/// Cheap exact path: the whole buffer is one JSON object.
pub(crate) fn classify_whole_buffer(text: &str) -> Option<PlanClassification> {
    let value: Value = serde_json::from_str(text).ok()?;
    if !value.is_object() {
        return None;
    }

    if has_key(&value, "resource_changes") || has_key(&value, "planned_values") {
        return Some(PlanClassification::from_plan_object(value));
    }
    if mentions_diagnostic(&value) {
        return Some(PlanClassification::Diagnostics {
            entries: vec![value],
        });
    }
    None
}

fn mentions_diagnostic(obj: &Value) -> bool {
    field_text_lower(obj, "@message").contains("diagnostic")
}

fn is_diagnostic_fragment(obj: &Value) -> bool {
    if mentions_diagnostic(obj) {
        return true;
    }
    let level = field_text_lower(obj, "@level");
    level.contains("error") || level.contains("warning")
}

/// Lines that are a complete JSON object on their own and mention a diagnostic.
fn diagnostic_lines(text: &str) -> Vec<Value> {
    split_lines(text)
        .map(str::trim)
        .filter(|line| line.starts_with('{') && line.ends_with('}'))
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(|value| value.is_object() && mentions_diagnostic(value))
        .collect()
}
