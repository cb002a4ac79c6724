use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod action;

pub use action::{ActionKind, ActionTally};

/// Maximum number of found objects echoed back in `objects_sample`.
pub const OBJECTS_SAMPLE_LIMIT: usize = 5;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParsingResult {
    FullPlan,
    PartialPlan,
    DiagnosticsFound,
    ObjectsFound,
}

impl ParsingResult {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullPlan => "full_plan",
            Self::PartialPlan => "partial_plan",
            Self::DiagnosticsFound => "diagnostics_found",
            Self::ObjectsFound => "objects_found",
        }
    }
}

/// Caller-visible result of one classification request.
///
/// The field set is fixed per `parsing_result`; the `objects_*` and `message`
/// fields are only present for `objects_found`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct AnalysisResponse {
    pub terraform_version: Option<String>,
    pub total_changes: usize,
    #[serde(flatten)]
    pub tally: ActionTally,
    pub diagnostics: Vec<serde_json::Value>,
    pub parsing_result: ParsingResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects_sample: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalysisResponse {
    #[must_use]
    pub fn diagnostics_found(diagnostics: Vec<serde_json::Value>) -> Self {
        Self {
            terraform_version: None,
            total_changes: 0,
            tally: ActionTally::default(),
            diagnostics,
            parsing_result: ParsingResult::DiagnosticsFound,
            objects_count: None,
            objects_sample: None,
            message: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub hint: Option<String>,
}

/// HTTP error body. `detail` mirrors `error.message` for clients that only
/// read a flat string.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorBody {
    pub detail: String,
    pub error: ErrorEnvelope,
}

impl ErrorBody {
    #[must_use]
    pub fn new(envelope: ErrorEnvelope) -> Self {
        Self {
            detail: envelope.message.clone(),
            error: envelope,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub struct HealthStatus {
    pub ok: bool,
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// JSON schema of [`AnalysisResponse`].
pub fn response_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(AnalysisResponse);
    serde_json::to_value(schema).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn diagnostics_response_omits_object_fields() {
        let response =
            AnalysisResponse::diagnostics_found(vec![serde_json::json!({"@level": "error"})]);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "terraform_version": null,
                "total_changes": 0,
                "create": 0,
                "update": 0,
                "delete": 0,
                "replace": 0,
                "no-op": 0,
                "diagnostics": [{"@level": "error"}],
                "parsing_result": "diagnostics_found"
            })
        );
    }

    #[test]
    fn response_roundtrips_through_flattened_tally() {
        let raw = r#"{"terraform_version":"1.5.0","total_changes":2,"create":0,"update":1,"delete":0,"replace":0,"no-op":1,"diagnostics":[],"parsing_result":"full_plan"}"#;
        let response: AnalysisResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.tally.update, 1);
        assert_eq!(response.tally.no_op, 1);
        assert_eq!(response.parsing_result, ParsingResult::FullPlan);
        assert_eq!(serialize_json(&response).unwrap(), raw);
    }

    #[test]
    fn schema_lists_parsing_result() {
        let schema = response_schema().unwrap();
        let text = schema.to_string();
        assert!(text.contains("parsing_result"));
        assert!(text.contains("no-op"));
    }
}
