//! refex-quality: Extraction quality contract.
//!
//! - `ScoringConstants`: bonus/penalty weights
//! - `QualityScore` / `DataQualityMetrics`: pure scoring over run outcomes
//! - `ExtractionContract`: begin → (external scrape) → complete → result
//! - `QualityValidator`: threshold gating with recommendations

pub mod constants;
pub mod score;
pub mod metrics;
pub mod metadata;
pub mod result;
pub mod contract;
pub mod validator;

pub use constants::ScoringConstants;
pub use contract::{ExtractionContract, DEFAULT_MINIMUM_QUALITY_THRESHOLD};
pub use metadata::ExtractionMetadata;
pub use metrics::DataQualityMetrics;
pub use result::{ExtractionResult, ExtractionStatus};
pub use score::QualityScore;
pub use validator::{
    QualityValidator, Severity, ValidationIssue, ValidationResult, ValidationRule,
    ValidationSummary, ValidationThresholds,
};
