//! The scored outcome of one extraction run.

use refex_common::{Manuscript, PdfRecord, Referee};
use serde::{Deserialize, Serialize};

use crate::metadata::ExtractionMetadata;
use crate::metrics::DataQualityMetrics;
use crate::score::QualityScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Success        => "success",
            ExtractionStatus::PartialSuccess => "partial_success",
            ExtractionStatus::Failed         => "failed",
        }
    }
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub journal_code: String,
    pub journal_name: String,
    pub status: ExtractionStatus,
    pub manuscripts: Vec<Manuscript>,
    #[serde(default)]
    pub referees: Vec<Referee>,
    #[serde(default)]
    pub pdfs: Vec<PdfRecord>,
    pub quality_score: QualityScore,
    pub metrics: DataQualityMetrics,
    #[serde(default)]
    pub metadata: Option<ExtractionMetadata>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExtractionStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == ExtractionStatus::Failed
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn manuscript_ids(&self) -> Vec<&str> {
        self.manuscripts.iter().map(|m| m.manuscript_id.as_str()).collect()
    }

    /// JSON form used to persist run summaries.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// One-line human summary for CLI output.
    pub fn summary_line(&self) -> String {
        format!(
            "{}: {} (score {:.2}): {} manuscripts, {} referees ({} with email), {}/{} PDFs, {} errors, {} warnings",
            self.journal_code,
            self.status,
            self.quality_score.overall_score,
            self.metrics.total_manuscripts_found,
            self.metrics.total_referees_found,
            self.metrics.total_referees_with_emails,
            self.metrics.total_pdfs_downloaded,
            self.metrics.total_pdfs_attempted,
            self.errors.len(),
            self.warnings.len(),
        )
    }
}
