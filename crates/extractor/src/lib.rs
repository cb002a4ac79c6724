//! # tfplan extractor
//!
//! Recovers Terraform plan JSON from text that may be truncated, wrapped in
//! log noise, or made of several unrelated fragments, then classifies what it
//! found and counts resource actions.
//!
//! ## Architecture
//!
//! ```text
//! Raw text
//!     │
//!     ├──> Whole-buffer parse (cheap, exact)
//!     │
//!     ├──> Fragment Scanner (all strategies, unioned)
//!     │    ├─> balanced {..} / [..] spans
//!     │    ├─> line-accumulated objects
//!     │    ├─> keyword windows (resource_changes, planned_values, ...)
//!     │    └─> lazy multiline {..} with brace-count check
//!     │
//!     ├──> Deduplicator (canonical JSON, first occurrence wins)
//!     │
//!     ├──> Plan Classifier
//!     │    full plan > partial plan > diagnostics > unclassified > not found
//!     │
//!     └──> Action Tally + Result Composer → AnalysisResponse
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tfplan_extractor::{ExtractorConfig, PlanAnalyzer};
//!
//! let analyzer = PlanAnalyzer::new(ExtractorConfig::default()).unwrap();
//! let text =
//!     r#"{"terraform_version":"1.5.0","resource_changes":[{"change":{"actions":["create"]}}]}"#;
//!
//! let response = analyzer.classify_and_tally(text).unwrap();
//! assert_eq!(response.parsing_result.as_str(), "full_plan");
//! assert_eq!(response.tally.create, 1);
//! ```

mod analyzer;
mod classifier;
mod compose;
mod config;
mod decode;
mod dedup;
mod error;
mod json;
mod resources;
mod scanner;
mod tally;
mod types;

pub use analyzer::PlanAnalyzer;
pub use classifier::PlanClassifier;
pub use compose::compose;
pub use config::ExtractorConfig;
pub use decode::decode_payload;
pub use dedup::{canonical_json, FoundSet};
pub use error::{ExtractorError, Result};
pub use resources::{list_resources, ResourceFilter, ResourceListing};
pub use scanner::{FragmentScanner, ScanStrategy, PLAN_KEYWORDS};
pub use tally::{tally_resource_changes, tally_values};
pub use types::{PlanClassification, ResourceChange, ResourceSummary};

pub use tfplan_protocol::{ActionKind, ActionTally, AnalysisResponse, ParsingResult};
