use serde_json::Value;
use tfplan_extractor::{ActionKind, AnalysisResponse, ParsingResult};

/// Plain-text summary of a classification, for `--format text`.
pub fn render_summary(response: &AnalysisResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Result: {}\n",
        describe_result(response.parsing_result)
    ));
    if let Some(version) = &response.terraform_version {
        out.push_str(&format!("Terraform: {version}\n"));
    }

    if response.parsing_result != ParsingResult::DiagnosticsFound {
        out.push_str(&format!("Total changes: {}\n", response.total_changes));
        for action in ActionKind::ALL {
            out.push_str(&format!(
                "  {:<8} {}\n",
                action.as_str(),
                response.tally.get(action)
            ));
        }
    }

    if let Some(message) = &response.message {
        out.push_str(&format!("{message}\n"));
    }

    if !response.diagnostics.is_empty() {
        out.push_str(&format!("Diagnostics ({}):\n", response.diagnostics.len()));
        for entry in &response.diagnostics {
            out.push_str(&format!("  - {}\n", diagnostic_line(entry)));
        }
    }

    out.trim_end().to_string()
}

fn describe_result(result: ParsingResult) -> &'static str {
    match result {
        ParsingResult::FullPlan => "full plan",
        ParsingResult::PartialPlan => "partial plan (no resource_changes)",
        ParsingResult::DiagnosticsFound => "diagnostics only",
        ParsingResult::ObjectsFound => "unclassified JSON objects",
    }
}

/// `severity - summary`, taken from the nested `diagnostic` object when present
/// and from the log line's `@level`/`@message` otherwise.
fn diagnostic_line(entry: &Value) -> String {
    let nested = entry.get("diagnostic");
    let pick = |nested_key: &str, flat_key: &str| {
        nested
            .and_then(|d| d.get(nested_key))
            .or_else(|| entry.get(flat_key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let severity = pick("severity", "@level").unwrap_or_else(|| "unknown".to_string());
    let summary = pick("summary", "@message").unwrap_or_else(|| entry.to_string());
    format!("{severity} - {summary}")
}
