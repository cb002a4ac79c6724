use serde::{Deserialize, Serialize};

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Skip the stringified keyword fallback for objects whose structural
    /// fields (`change.actions`, `action`, `type`) already produced a count.
    /// Off by default, which keeps the legacy over-counting totals.
    pub strict_tally: bool,

    /// Characters kept before the first keyword occurrence in keyword windows
    pub keyword_window_before: usize,

    /// Characters kept after the start of the first keyword occurrence
    pub keyword_window_after: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            strict_tally: false,
            keyword_window_before: 1_000,
            keyword_window_after: 10_000,
        }
    }
}

impl ExtractorConfig {
    /// Config that never double counts an object in the action tally
    pub fn strict() -> Self {
        Self {
            strict_tally: true,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.keyword_window_after == 0 {
            return Err("keyword_window_after must be > 0".to_string());
        }

        Ok(())
    }
}
