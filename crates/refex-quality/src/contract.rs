//! Per-journal extraction contract.
//!
//! Protocol: `begin_extraction` → (scrape, external) → `complete_extraction`
//! → `create_result`. The contract never fails on bad data; malformed input
//! lowers the score instead.

use std::collections::HashSet;

use chrono::Utc;
use refex_common::entities::normalize_code;
use refex_common::{ErrorKind, Manuscript, PdfRecord, Referee};
use tracing::{debug, info, warn};

use crate::constants::ScoringConstants;
use crate::metadata::ExtractionMetadata;
use crate::metrics::DataQualityMetrics;
use crate::result::{ExtractionResult, ExtractionStatus};
use crate::score::QualityScore;

pub const DEFAULT_MINIMUM_QUALITY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct ExtractionContract {
    journal_code: String,
    journal_name: String,
    minimum_quality_threshold: f64,
    constants: ScoringConstants,
    expected_manuscripts: Option<usize>,
    metadata: ExtractionMetadata,
}

impl ExtractionContract {
    pub fn new(journal_code: &str, journal_name: impl Into<String>) -> Self {
        let journal_code = normalize_code(journal_code);
        let journal_name = journal_name.into();
        let metadata = ExtractionMetadata::new(&journal_code, &journal_name);
        Self {
            journal_code,
            journal_name,
            minimum_quality_threshold: DEFAULT_MINIMUM_QUALITY_THRESHOLD,
            constants: ScoringConstants::default(),
            expected_manuscripts: None,
            metadata,
        }
    }

    pub fn with_threshold(mut self, minimum_quality_threshold: f64) -> Self {
        self.minimum_quality_threshold = minimum_quality_threshold;
        self
    }

    pub fn with_constants(mut self, constants: ScoringConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Score manuscript completeness against a known total instead of the
    /// binary found/not-found rule.
    pub fn with_expected_manuscripts(mut self, expected: usize) -> Self {
        self.expected_manuscripts = Some(expected);
        self
    }

    pub fn journal_code(&self) -> &str {
        &self.journal_code
    }

    pub fn minimum_quality_threshold(&self) -> f64 {
        self.minimum_quality_threshold
    }

    pub fn metadata(&self) -> &ExtractionMetadata {
        &self.metadata
    }

    /// Start timing. Calling again resets the start time.
    pub fn begin_extraction(&mut self, config: serde_json::Value) {
        self.metadata.started_at = Some(Utc::now());
        self.metadata.completed_at = None;
        self.metadata.duration_seconds = 0.0;
        self.metadata.config = config;
        self.metadata.log_action("extraction started");
        info!(journal = %self.journal_code, run_id = %self.metadata.run_id, "Extraction started");
    }

    /// Stop timing. Without a recorded start the duration is 0.
    pub fn complete_extraction(&mut self) {
        let now = Utc::now();
        self.metadata.completed_at = Some(now);
        self.metadata.duration_seconds = self
            .metadata
            .started_at
            .map(|start| (now - start).num_milliseconds().max(0) as f64 / 1000.0)
            .unwrap_or(0.0);
        self.metadata.log_action("extraction completed");
        info!(
            journal = %self.journal_code,
            duration_s = self.metadata.duration_seconds,
            "Extraction completed"
        );
    }

    pub fn log_action(&mut self, message: impl Into<String>) {
        self.metadata.log_action(message);
    }

    /// Record a failure reported by the extractor. Feeds the error counters
    /// and the matching issue flag of the score.
    pub fn record_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let message = message.into();
        debug!(journal = %self.journal_code, kind = %kind, "{message}");
        self.metadata.log_error(kind, message);
    }

    /// Build the scored result for this run.
    pub fn create_result(
        &self,
        manuscripts: Vec<Manuscript>,
        referees: Vec<Referee>,
        pdfs: Vec<PdfRecord>,
    ) -> ExtractionResult {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if self.metadata.started_at.is_none() {
            warnings.push("create_result called before begin_extraction".to_string());
        }

        // ── 1. Metrics ───────────────────────────────────────────────────────
        let found = manuscripts.len();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut missing_id = 0usize;
        let mut duplicate_id = 0usize;
        for m in &manuscripts {
            let id = m.manuscript_id.trim();
            if id.is_empty() {
                missing_id += 1;
            } else if !seen.insert(id) {
                duplicate_id += 1;
            }
        }
        let malformed = missing_id + duplicate_id;

        // A standalone referee list, when given, is authoritative.
        let pool: Vec<&Referee> = if referees.is_empty() {
            manuscripts.iter().flat_map(|m| m.referees.iter()).collect()
        } else {
            referees.iter().collect()
        };

        let mut metrics = DataQualityMetrics {
            total_manuscripts_found: found,
            total_manuscripts_processed: found - missing_id,
            total_referees_found: pool.len(),
            total_referees_with_emails: pool.iter().filter(|r| r.has_email()).count(),
            total_pdfs_attempted: pdfs.len(),
            total_pdfs_downloaded: pdfs.iter().filter(|p| p.is_downloaded()).count(),
            ..Default::default()
        };
        for entry in &self.metadata.errors {
            metrics.record_error(entry.kind);
            errors.push(format!("[{}] {}", entry.kind, entry.message));
        }
        metrics.set_duration(self.metadata.duration_seconds);
        metrics.calculate_success_rates();

        // ── 2. Score ─────────────────────────────────────────────────────────
        let mut score = QualityScore {
            manuscript_completeness: match self.expected_manuscripts {
                Some(expected) if expected > 0 => (found as f64 / expected as f64).min(1.0),
                _ => if found > 0 { 1.0 } else { 0.0 },
            },
            referee_completeness: fraction(metrics.total_referees_with_emails, metrics.total_referees_found),
            pdf_success_rate: fraction(metrics.total_pdfs_downloaded, metrics.total_pdfs_attempted),
            data_integrity: if found == 0 { 1.0 } else { 1.0 - malformed as f64 / found as f64 },
            has_referee_emails: metrics.total_referees_with_emails > 0,
            has_pdfs: metrics.total_pdfs_downloaded > 0
                || manuscripts.iter().any(|m| m.pdf_path.is_some()),
            has_reports: pool.iter().any(|r| r.report.is_some()),
            has_complete_dates: found > 0 && manuscripts.iter().all(Manuscript::has_complete_dates),
            ..Default::default()
        };
        for entry in &self.metadata.errors {
            score.flag_issue(entry.kind);
        }
        score.calculate_overall_score(&self.constants);

        // ── 3. Status ────────────────────────────────────────────────────────
        let status = if found == 0 {
            ExtractionStatus::Failed
        } else if score.overall_score >= self.minimum_quality_threshold {
            ExtractionStatus::Success
        } else {
            ExtractionStatus::PartialSuccess
        };

        if found == 0 {
            errors.push(format!("No manuscripts extracted for {}", self.journal_code));
        }
        if missing_id > 0 {
            warnings.push(format!("{missing_id} manuscript(s) without an ID"));
        }
        if duplicate_id > 0 {
            warnings.push(format!("{duplicate_id} duplicate manuscript ID(s)"));
        }
        if found > 0 && metrics.total_referees_found == 0 {
            warnings.push("No referees found".to_string());
        }
        let failed_pdfs = metrics.total_pdfs_attempted - metrics.total_pdfs_downloaded;
        if failed_pdfs > 0 {
            warnings.push(format!(
                "{failed_pdfs} of {} PDF download(s) failed",
                metrics.total_pdfs_attempted
            ));
        }

        if status == ExtractionStatus::Failed {
            warn!(journal = %self.journal_code, "Extraction failed: no manuscripts");
        } else {
            info!(
                journal = %self.journal_code,
                status = %status,
                score = score.overall_score,
                manuscripts = found,
                "Extraction result created"
            );
        }

        // ── 4. Bundle ────────────────────────────────────────────────────────
        let mut metadata = self.metadata.clone();
        metadata.log_action(format!("result created: {status}"));

        ExtractionResult {
            journal_code: self.journal_code.clone(),
            journal_name: self.journal_name.clone(),
            status,
            manuscripts,
            referees,
            pdfs,
            quality_score: score,
            metrics,
            metadata: Some(metadata),
            errors,
            warnings,
        }
    }
}

fn fraction(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refex_common::RefereeReport;

    fn referee(name: &str, email: Option<&str>) -> Referee {
        let r = Referee::new(name).unwrap();
        match email {
            Some(e) => r.with_email(e),
            None => r,
        }
    }

    #[test]
    fn test_code_is_normalized() {
        let c = ExtractionContract::new("sicon", "SICON");
        assert_eq!(c.journal_code(), "SICON");
        assert_eq!(c.minimum_quality_threshold(), 0.7);
    }

    #[test]
    fn test_duration_without_begin_is_zero() {
        let mut c = ExtractionContract::new("FS", "Finance and Stochastics");
        c.complete_extraction();
        assert_eq!(c.metadata().duration_seconds, 0.0);
        assert!(c.metadata().completed_at.is_some());
    }

    #[test]
    fn test_begin_twice_resets_start() {
        let mut c = ExtractionContract::new("FS", "FS");
        c.begin_extraction(serde_json::json!({"attempt": 1}));
        let first = c.metadata().started_at.unwrap();
        c.begin_extraction(serde_json::json!({"attempt": 2}));
        assert!(c.metadata().started_at.unwrap() >= first);
        assert_eq!(c.metadata().config["attempt"], 2);
    }

    #[test]
    fn test_missing_begin_is_a_warning() {
        let c = ExtractionContract::new("FS", "FS");
        let result = c.create_result(vec![Manuscript::new("FS-1", "t")], vec![], vec![]);
        assert!(result.warnings.iter().any(|w| w.contains("begin_extraction")));
    }

    #[test]
    fn test_data_integrity_penalises_missing_and_duplicate_ids() {
        let c = ExtractionContract::new("MF", "MF");
        let result = c.create_result(
            vec![
                Manuscript::new("MAFI-1", "a"),
                Manuscript::new("MAFI-1", "a again"),
                Manuscript::new("", "no id"),
                Manuscript::new("MAFI-2", "b"),
            ],
            vec![],
            vec![],
        );
        assert!((result.quality_score.data_integrity - 0.5).abs() < 1e-9);
        assert_eq!(result.metrics.total_manuscripts_processed, 3);
        assert!(result.warnings.contains(&"1 manuscript(s) without an ID".to_string()));
        assert!(result.warnings.contains(&"1 duplicate manuscript ID(s)".to_string()));
    }

    #[test]
    fn test_standalone_referees_are_authoritative() {
        let c = ExtractionContract::new("MF", "MF");
        let mut m = Manuscript::new("MAFI-1", "a");
        m.referees.push(referee("Doe, Jane", None));
        let standalone = vec![
            referee("Doe, Jane", Some("jane@uni.edu")),
            referee("Roe, Rick", None),
        ];
        let result = c.create_result(vec![m], standalone, vec![]);
        assert_eq!(result.metrics.total_referees_found, 2);
        assert_eq!(result.metrics.total_referees_with_emails, 1);
        assert!((result.quality_score.referee_completeness - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_pdf_records_and_indicators() {
        let c = ExtractionContract::new("MF", "MF");
        let mut m = Manuscript::new("MAFI-1", "a");
        m.referees.push(referee("Doe, Jane", Some("j@x.org")).with_report(RefereeReport::default()));
        let pdfs = vec![
            PdfRecord::downloaded("MAFI-1", "/tmp/MAFI-1.pdf"),
            PdfRecord::failed("MAFI-1", "timeout"),
        ];
        let result = c.create_result(vec![m], vec![], pdfs);
        assert_eq!(result.metrics.total_pdfs_attempted, 2);
        assert_eq!(result.metrics.total_pdfs_downloaded, 1);
        assert_eq!(result.metrics.pdf_success_rate, Some(0.5));
        assert!(result.quality_score.has_pdfs);
        assert!(result.quality_score.has_reports);
        assert!(!result.quality_score.has_complete_dates);
    }

    #[test]
    fn test_recorded_errors_raise_flags() {
        let mut c = ExtractionContract::new("SICON", "SICON");
        c.begin_extraction(serde_json::Value::Null);
        c.record_error(ErrorKind::Authentication, "ORCID login rejected");
        c.record_error(ErrorKind::Download, "PDF timed out");
        c.complete_extraction();
        let result = c.create_result(vec![Manuscript::new("M1", "t")], vec![], vec![]);
        assert!(result.quality_score.authentication_issues);
        assert!(result.quality_score.download_issues);
        assert!(!result.quality_score.navigation_issues);
        assert_eq!(result.metrics.authentication_errors, 1);
        assert!(result.errors.iter().any(|e| e.starts_with("[authentication]")));
    }

    #[test]
    fn test_expected_count_scales_completeness() {
        let c = ExtractionContract::new("FS", "FS").with_expected_manuscripts(4);
        let result = c.create_result(vec![Manuscript::new("FS-1", "t")], vec![], vec![]);
        assert!((result.quality_score.manuscript_completeness - 0.25).abs() < 1e-9);
    }
}
