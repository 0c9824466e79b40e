//! Threshold gating of extraction results.
//!
//! The validator is a pure function of `(result, thresholds)`. Strict mode
//! raises every cutoff by the same amount; the rule set is unchanged.

use refex_common::ErrorKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::result::{ExtractionResult, ExtractionStatus};

/// Added to every threshold in strict mode.
pub const STRICT_MODE_INCREMENT: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationThresholds {
    #[serde(default = "default_min_overall")]
    pub minimum_overall_score: f64,
    #[serde(default = "default_min_manuscript_completeness")]
    pub minimum_manuscript_completeness: f64,
    #[serde(default = "default_min_referee_completeness")]
    pub minimum_referee_completeness: f64,
    #[serde(default = "default_min_pdf_success_rate")]
    pub minimum_pdf_success_rate: f64,
    #[serde(default = "default_min_data_integrity")]
    pub minimum_data_integrity: f64,
}

fn default_min_overall() -> f64 { 0.6 }
fn default_min_manuscript_completeness() -> f64 { 0.5 }
fn default_min_referee_completeness() -> f64 { 0.3 }
fn default_min_pdf_success_rate() -> f64 { 0.3 }
fn default_min_data_integrity() -> f64 { 0.7 }

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            minimum_overall_score:           default_min_overall(),
            minimum_manuscript_completeness: default_min_manuscript_completeness(),
            minimum_referee_completeness:    default_min_referee_completeness(),
            minimum_pdf_success_rate:        default_min_pdf_success_rate(),
            minimum_data_integrity:          default_min_data_integrity(),
        }
    }
}

impl ValidationThresholds {
    pub fn strict() -> Self {
        Self::default().raised_by(STRICT_MODE_INCREMENT)
    }

    /// Every threshold plus `delta`, capped at 1.0.
    pub fn raised_by(&self, delta: f64) -> Self {
        let raise = |v: f64| (v + delta).min(1.0);
        Self {
            minimum_overall_score:           raise(self.minimum_overall_score),
            minimum_manuscript_completeness: raise(self.minimum_manuscript_completeness),
            minimum_referee_completeness:    raise(self.minimum_referee_completeness),
            minimum_pdf_success_rate:        raise(self.minimum_pdf_success_rate),
            minimum_data_integrity:          raise(self.minimum_data_integrity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    OverallScore,
    ExtractionFailed,
    ManuscriptCompleteness,
    RefereeCompleteness,
    PdfSuccessRate,
    DataIntegrity,
    AuthenticationIssues,
    NavigationIssues,
    ParsingIssues,
    DownloadIssues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub rule: ValidationRule,
    pub severity: Severity,
    pub message: String,
    pub observed: Option<f64>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl ValidationSummary {
    fn from_issues(issues: &[ValidationIssue]) -> Self {
        let count = |s: Severity| issues.iter().filter(|i| i.severity == s).count();
        Self {
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            infos: count(Severity::Info),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub journal_code: String,
    /// True iff no error-severity issue was raised.
    pub is_valid: bool,
    pub score: f64,
    pub threshold: f64,
    pub strict_mode: bool,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
    pub recommendations: Vec<String>,
}

impl ValidationResult {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn has_issue(&self, rule: ValidationRule) -> bool {
        self.issues.iter().any(|i| i.rule == rule)
    }
}

#[derive(Debug, Clone)]
pub struct QualityValidator {
    strict_mode: bool,
    thresholds: ValidationThresholds,
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new(false)
    }
}

impl QualityValidator {
    pub fn new(strict_mode: bool) -> Self {
        Self::with_thresholds(ValidationThresholds::default(), strict_mode)
    }

    /// Custom base thresholds; strict mode raises them uniformly.
    pub fn with_thresholds(base: ValidationThresholds, strict_mode: bool) -> Self {
        let thresholds = if strict_mode { base.raised_by(STRICT_MODE_INCREMENT) } else { base };
        Self { strict_mode, thresholds }
    }

    pub fn strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub fn thresholds(&self) -> &ValidationThresholds {
        &self.thresholds
    }

    pub fn validate_extraction_result(
        &self,
        result: &ExtractionResult,
        threshold: Option<f64>,
    ) -> ValidationResult {
        let t = &self.thresholds;
        let q = &result.quality_score;
        let threshold = threshold.unwrap_or(t.minimum_overall_score);
        let secondary = if self.strict_mode { Severity::Error } else { Severity::Warning };
        let mut issues = Vec::new();

        if result.status == ExtractionStatus::Failed {
            issues.push(ValidationIssue {
                rule: ValidationRule::ExtractionFailed,
                severity: Severity::Error,
                message: "Extraction produced no manuscripts".to_string(),
                observed: Some(result.metrics.total_manuscripts_found as f64),
                threshold: None,
            });
        }

        if q.overall_score < threshold {
            issues.push(below(
                ValidationRule::OverallScore,
                Severity::Error,
                "Overall quality score",
                q.overall_score,
                threshold,
            ));
        }

        let checks = [
            (ValidationRule::ManuscriptCompleteness, "Manuscript completeness", q.manuscript_completeness, t.minimum_manuscript_completeness),
            (ValidationRule::RefereeCompleteness, "Referee completeness", q.referee_completeness, t.minimum_referee_completeness),
            (ValidationRule::DataIntegrity, "Data integrity", q.data_integrity, t.minimum_data_integrity),
        ];
        for (rule, label, observed, min) in checks {
            if observed < min {
                issues.push(below(rule, secondary, label, observed, min));
            }
        }

        if result.metrics.total_pdfs_attempted == 0 {
            issues.push(ValidationIssue {
                rule: ValidationRule::PdfSuccessRate,
                severity: Severity::Info,
                message: "No PDF downloads were attempted".to_string(),
                observed: None,
                threshold: Some(t.minimum_pdf_success_rate),
            });
        } else if q.pdf_success_rate < t.minimum_pdf_success_rate {
            issues.push(below(
                ValidationRule::PdfSuccessRate,
                secondary,
                "PDF success rate",
                q.pdf_success_rate,
                t.minimum_pdf_success_rate,
            ));
        }

        for kind in q.issues() {
            let (rule, message) = match kind {
                ErrorKind::Authentication => (ValidationRule::AuthenticationIssues, "Authentication issues were reported"),
                ErrorKind::Navigation     => (ValidationRule::NavigationIssues, "Navigation issues were reported"),
                ErrorKind::Parsing        => (ValidationRule::ParsingIssues, "Parsing issues were reported"),
                ErrorKind::Download       => (ValidationRule::DownloadIssues, "Download issues were reported"),
                // no score flag of their own
                ErrorKind::Configuration | ErrorKind::Validation => continue,
            };
            issues.push(ValidationIssue {
                rule,
                severity: Severity::Warning,
                message: message.to_string(),
                observed: None,
                threshold: None,
            });
        }

        let summary = ValidationSummary::from_issues(&issues);
        let recommendations = recommendations_for(&issues);
        let is_valid = summary.errors == 0;

        debug!(
            journal = %result.journal_code,
            valid = is_valid,
            errors = summary.errors,
            warnings = summary.warnings,
            "Validated extraction result"
        );

        ValidationResult {
            journal_code: result.journal_code.clone(),
            is_valid,
            score: q.overall_score,
            threshold,
            strict_mode: self.strict_mode,
            issues,
            summary,
            recommendations,
        }
    }
}

fn below(rule: ValidationRule, severity: Severity, label: &str, observed: f64, threshold: f64) -> ValidationIssue {
    ValidationIssue {
        rule,
        severity,
        message: format!("{label} {observed:.2} is below {threshold:.2}"),
        observed: Some(observed),
        threshold: Some(threshold),
    }
}

fn recommendation(rule: ValidationRule) -> &'static str {
    match rule {
        ValidationRule::ExtractionFailed =>
            "Verify that the editor dashboard lists manuscripts and that the login succeeded",
        ValidationRule::OverallScore =>
            "Inspect the component scores and rerun the extraction once the underlying issues are fixed",
        ValidationRule::ManuscriptCompleteness =>
            "Check that every dashboard category was visited",
        ValidationRule::RefereeCompleteness =>
            "Run the referee email lookup for referees without an address",
        ValidationRule::PdfSuccessRate =>
            "Retry the failed PDF downloads",
        ValidationRule::DataIntegrity =>
            "Review manuscript ID extraction: IDs are missing or duplicated",
        ValidationRule::AuthenticationIssues =>
            "Retry with credentials refreshed",
        ValidationRule::NavigationIssues =>
            "Check the journal site for layout or URL changes",
        ValidationRule::ParsingIssues =>
            "Update the extractor selectors for this journal",
        ValidationRule::DownloadIssues =>
            "Check PDF links and download timeouts",
    }
}

fn recommendations_for(issues: &[ValidationIssue]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for issue in issues.iter().filter(|i| i.severity != Severity::Info) {
        let text = recommendation(issue.rule).to_string();
        if !out.contains(&text) {
            out.push(text);
        }
    }
    out
}
