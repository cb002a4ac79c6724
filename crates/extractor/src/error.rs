use thiserror::Error;

/// Result type for extractor operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Errors that can surface from the extraction pipeline.
///
/// Per-candidate parse failures never show up here; the scanner drops them.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// No strategy recovered anything usable
    #[error(
        "Could not find Terraform plan JSON (objects found: {objects_scanned}, diagnostics: {diagnostics_scanned})"
    )]
    PlanNotFound {
        objects_scanned: usize,
        diagnostics_scanned: usize,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource listing requested for something that is not a full plan
    #[error("Resource listing needs a full plan, got {0}")]
    NotAFullPlan(&'static str),
}

impl ExtractorError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Stable machine-readable code used by transports
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PlanNotFound { .. } => "plan_not_found",
            Self::InvalidConfig(_) => "invalid_config",
            Self::NotAFullPlan(_) => "not_a_full_plan",
        }
    }
}
