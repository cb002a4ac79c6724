use crate::classifier::PlanClassifier;
use crate::compose::compose;
use crate::config::ExtractorConfig;
use crate::decode::decode_payload;
use crate::error::{ExtractorError, Result};
use crate::resources::{list_resources, ResourceFilter, ResourceListing};
use crate::types::PlanClassification;
use tfplan_protocol::AnalysisResponse;

/// Entry point of the pipeline.
///
/// Build one at startup and share it by reference; it holds only immutable
/// configuration, so every call works on its own fresh data.
#[derive(Debug, Clone)]
pub struct PlanAnalyzer {
    config: ExtractorConfig,
    classifier: PlanClassifier,
}

impl PlanAnalyzer {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate().map_err(ExtractorError::invalid_config)?;
        let classifier = PlanClassifier::new(&config);
        Ok(Self { config, classifier })
    }

    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    #[must_use]
    pub fn classify(&self, text: &str) -> PlanClassification {
        self.classifier.classify(text)
    }

    /// Classify a buffer and compose the response.
    pub fn classify_and_tally(&self, text: &str) -> Result<AnalysisResponse> {
        let classification = self.classify(text);
        log::info!(
            "classified {} chars as {}",
            text.chars().count(),
            classification.label()
        );
        compose(classification, self.config.strict_tally)
    }

    /// Decode raw upload bytes, then [`Self::classify_and_tally`].
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisResponse> {
        self.classify_and_tally(&decode_payload(bytes))
    }

    /// Normalized resource rows of a full plan, with the per-action summary.
    pub fn resources(&self, text: &str, filter: &ResourceFilter) -> Result<ResourceListing> {
        match self.classify(text) {
            PlanClassification::FullPlan {
                resource_changes, ..
            } => Ok(list_resources(&resource_changes, filter)),
            PlanClassification::NotFound {
                objects_scanned,
                diagnostics_scanned,
            } => Err(ExtractorError::PlanNotFound {
                objects_scanned,
                diagnostics_scanned,
            }),
            other => Err(ExtractorError::NotAFullPlan(other.label())),
        }
    }
}

impl Default for PlanAnalyzer {
    fn default() -> Self {
        let config = ExtractorConfig::default();
        let classifier = PlanClassifier::new(&config);
        Self { config, classifier }
    }
}
