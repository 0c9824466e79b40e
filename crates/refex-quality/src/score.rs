//! Composite quality score for one extraction run.
//!
//! overall = clamp(mean(components) + Σ bonuses − Σ penalties, 0, 1)

use refex_common::ErrorKind;
use serde::{Deserialize, Serialize};

use crate::constants::ScoringConstants;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityScore {
    // Components, each in [0, 1].
    pub manuscript_completeness: f64,
    pub referee_completeness: f64,
    pub pdf_success_rate: f64,
    pub data_integrity: f64,

    // Indicators (bonuses).
    pub has_referee_emails: bool,
    pub has_pdfs: bool,
    pub has_reports: bool,
    pub has_complete_dates: bool,

    // Issue flags (penalties).
    pub authentication_issues: bool,
    pub navigation_issues: bool,
    pub parsing_issues: bool,
    pub download_issues: bool,

    pub overall_score: f64,
}

impl QualityScore {
    pub fn components(&self) -> [f64; 4] {
        [
            self.manuscript_completeness,
            self.referee_completeness,
            self.pdf_success_rate,
            self.data_integrity,
        ]
    }

    /// Mean of the components, each clamped to [0, 1] first.
    pub fn component_mean(&self) -> f64 {
        let c = self.components();
        c.iter().map(|v| clamp_unit(*v)).sum::<f64>() / c.len() as f64
    }

    pub fn bonus(&self, constants: &ScoringConstants) -> f64 {
        let mut bonus = 0.0;
        if self.has_referee_emails { bonus += constants.email_bonus; }
        if self.has_pdfs           { bonus += constants.pdf_bonus; }
        if self.has_reports        { bonus += constants.report_bonus; }
        if self.has_complete_dates { bonus += constants.complete_dates_bonus; }
        bonus
    }

    pub fn penalty(&self, constants: &ScoringConstants) -> f64 {
        let mut penalty = 0.0;
        if self.authentication_issues { penalty += constants.authentication_penalty; }
        if self.navigation_issues     { penalty += constants.navigation_penalty; }
        if self.parsing_issues        { penalty += constants.parsing_penalty; }
        if self.download_issues       { penalty += constants.download_penalty; }
        penalty
    }

    /// Recompute and store `overall_score`; always in [0, 1].
    pub fn calculate_overall_score(&mut self, constants: &ScoringConstants) -> f64 {
        let raw = self.component_mean() + self.bonus(constants) - self.penalty(constants);
        self.overall_score = clamp_unit(raw);
        self.overall_score
    }

    /// Raise the issue flag matching an error category. Validation errors
    /// share the parsing flag, as they share its counter; configuration
    /// errors have no flag.
    pub fn flag_issue(&mut self, kind: ErrorKind) {
        match kind {
            ErrorKind::Authentication => self.authentication_issues = true,
            ErrorKind::Navigation     => self.navigation_issues = true,
            ErrorKind::Parsing | ErrorKind::Validation => self.parsing_issues = true,
            ErrorKind::Download       => self.download_issues = true,
            ErrorKind::Configuration  => {}
        }
    }

    pub fn issues(&self) -> Vec<ErrorKind> {
        let mut out = Vec::new();
        if self.authentication_issues { out.push(ErrorKind::Authentication); }
        if self.navigation_issues     { out.push(ErrorKind::Navigation); }
        if self.parsing_issues        { out.push(ErrorKind::Parsing); }
        if self.download_issues       { out.push(ErrorKind::Download); }
        out
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
