use crate::error::{ExtractorError, Result};
use crate::json::{array_field, string_field};
use crate::tally::{tally_resource_changes, tally_values};
use crate::types::PlanClassification;
use tfplan_protocol::{AnalysisResponse, ParsingResult, OBJECTS_SAMPLE_LIMIT};

/// Map a classification onto the caller-visible response shape.
///
/// `NotFound` is the only failure.
pub fn compose(classification: PlanClassification, strict_tally: bool) -> Result<AnalysisResponse> {
    match classification {
        PlanClassification::Diagnostics { entries } => {
            Ok(AnalysisResponse::diagnostics_found(entries))
        }

        PlanClassification::UnclassifiedObjects { objects, message } => {
            let tally = tally_values(objects.iter(), strict_tally);
            Ok(AnalysisResponse {
                terraform_version: None,
                total_changes: tally.total(),
                tally,
                diagnostics: Vec::new(),
                parsing_result: ParsingResult::ObjectsFound,
                objects_count: Some(objects.len()),
                objects_sample: Some(objects.sample(OBJECTS_SAMPLE_LIMIT)),
                message: Some(message),
            })
        }

        PlanClassification::PartialPlan { raw } => {
            let tally = tally_values(std::iter::once(&raw), strict_tally);
            Ok(AnalysisResponse {
                terraform_version: string_field(&raw, "terraform_version"),
                total_changes: tally.total(),
                tally,
                diagnostics: array_field(&raw, "diagnostics"),
                parsing_result: ParsingResult::PartialPlan,
                objects_count: None,
                objects_sample: None,
                message: None,
            })
        }

        PlanClassification::FullPlan {
            terraform_version,
            resource_changes,
            diagnostics,
        } => Ok(AnalysisResponse {
            terraform_version,
            total_changes: resource_changes.len(),
            tally: tally_resource_changes(&resource_changes),
            diagnostics,
            parsing_result: ParsingResult::FullPlan,
            objects_count: None,
            objects_sample: None,
            message: None,
        }),

        PlanClassification::NotFound {
            objects_scanned,
            diagnostics_scanned,
        } => Err(ExtractorError::PlanNotFound {
            objects_scanned,
            diagnostics_scanned,
        }),
    }
}
