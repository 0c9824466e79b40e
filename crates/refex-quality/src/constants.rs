//! Bonus and penalty constants applied on top of the component mean.
//! Loadable from the `[quality.constants]` table of `refex.toml`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConstants {
    /// At least one referee email was found.
    #[serde(default = "default_email_bonus")]
    pub email_bonus: f64,
    /// At least one PDF was obtained.
    #[serde(default = "default_pdf_bonus")]
    pub pdf_bonus: f64,
    /// At least one referee report was captured.
    #[serde(default = "default_report_bonus")]
    pub report_bonus: f64,
    /// Every manuscript and referee carries its key dates.
    #[serde(default = "default_complete_dates_bonus")]
    pub complete_dates_bonus: f64,

    #[serde(default = "default_authentication_penalty")]
    pub authentication_penalty: f64,
    #[serde(default = "default_navigation_penalty")]
    pub navigation_penalty: f64,
    #[serde(default = "default_parsing_penalty")]
    pub parsing_penalty: f64,
    #[serde(default = "default_download_penalty")]
    pub download_penalty: f64,
}

fn default_email_bonus() -> f64 { 0.10 }
fn default_pdf_bonus() -> f64 { 0.10 }
fn default_report_bonus() -> f64 { 0.05 }
fn default_complete_dates_bonus() -> f64 { 0.05 }
fn default_authentication_penalty() -> f64 { 0.20 }
fn default_navigation_penalty() -> f64 { 0.10 }
fn default_parsing_penalty() -> f64 { 0.10 }
fn default_download_penalty() -> f64 { 0.05 }

impl Default for ScoringConstants {
    fn default() -> Self {
        Self {
            email_bonus:            default_email_bonus(),
            pdf_bonus:              default_pdf_bonus(),
            report_bonus:           default_report_bonus(),
            complete_dates_bonus:   default_complete_dates_bonus(),
            authentication_penalty: default_authentication_penalty(),
            navigation_penalty:     default_navigation_penalty(),
            parsing_penalty:        default_parsing_penalty(),
            download_penalty:       default_download_penalty(),
        }
    }
}

impl ScoringConstants {
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.email_bonus,
            self.pdf_bonus,
            self.report_bonus,
            self.complete_dates_bonus,
            self.authentication_penalty,
            self.navigation_penalty,
            self.parsing_penalty,
            self.download_penalty,
        ]
    }

    /// All constants finite and non-negative.
    pub fn validate(&self) -> bool {
        self.as_array().iter().all(|c| c.is_finite() && *c >= 0.0)
    }

    pub fn max_bonus(&self) -> f64 {
        self.email_bonus + self.pdf_bonus + self.report_bonus + self.complete_dates_bonus
    }

    pub fn max_penalty(&self) -> f64 {
        self.authentication_penalty + self.navigation_penalty + self.parsing_penalty + self.download_penalty
    }
}
