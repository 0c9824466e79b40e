//! End-to-end extraction run for one journal.
//!
//! Orchestrates:
//!   1. Open the quality contract and snapshot the configuration
//!   2. Pull the raw output from a `ManuscriptSource`
//!   3. Normalise records into canonical manuscripts (dedup included)
//!   4. Check manuscript IDs against the journal's patterns
//!   5. Fetch pending PDFs when a PDF directory is configured
//!   6. Close the contract and build the scored `ExtractionResult`
//!
//! The run never aborts: source failures and bad records are recorded on
//! the contract and lower the score instead.

use std::path::PathBuf;

use refex_common::{ErrorKind, JournalConfig, PdfRecord, ProgressEvent, ProgressSink};
use refex_quality::{ExtractionContract, ExtractionResult, ScoringConstants, DEFAULT_MINIMUM_QUALITY_THRESHOLD};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::models::{ItemError, SourceOutput};
use crate::normalise::normalize_records;
use crate::pdf::PdfDownloader;
use crate::sources::ManuscriptSource;

// ── Run options ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    #[serde(default = "default_threshold")]
    pub minimum_quality_threshold: f64,
    #[serde(default)]
    pub constants: ScoringConstants,
    /// Drop manuscripts whose ID matches none of the journal's patterns
    /// instead of only warning about them.
    #[serde(default)]
    pub enforce_patterns: bool,
    /// Where pending PDFs are downloaded. `None` leaves them untouched.
    #[serde(default)]
    pub pdf_dir: Option<PathBuf>,
}

fn default_threshold() -> f64 {
    DEFAULT_MINIMUM_QUALITY_THRESHOLD
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            minimum_quality_threshold: default_threshold(),
            constants: ScoringConstants::default(),
            enforce_patterns: false,
            pdf_dir: None,
        }
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

#[instrument(skip_all, fields(journal = %journal.code(), source = source.name()))]
pub async fn run_extraction(
    journal: &JournalConfig,
    source: &dyn ManuscriptSource,
    options: &RunOptions,
    progress: &mut dyn ProgressSink,
) -> ExtractionResult {
    let code = journal.code().to_string();
    let mut contract = ExtractionContract::new(&code, journal.name.clone())
        .with_threshold(options.minimum_quality_threshold)
        .with_constants(options.constants.clone());

    let snapshot = serde_json::json!({
        "journal": serde_json::to_value(journal).unwrap_or_default(),
        "source": source.name(),
        "options": serde_json::to_value(options).unwrap_or_default(),
    });
    contract.begin_extraction(snapshot);
    progress.record(ProgressEvent::new(&code, "extract", format!("Extracting via {}", source.name())));

    // ── 1. Source ─────────────────────────────────────────────────────────────
    let output = match source.extract(journal).await {
        Ok(output) => output,
        Err(e) => {
            warn!("Source failed: {e}");
            contract.record_error(e.kind, e.message);
            SourceOutput::default()
        }
    };
    for e in &output.errors {
        contract.record_error(e.kind, e.message.clone());
    }
    contract.log_action(format!("{} record(s) received", output.manuscripts.len()));

    let SourceOutput { manuscripts: records, referees, mut pdfs, expected_manuscripts, .. } = output;

    // ── 2. Normalise ──────────────────────────────────────────────────────────
    let mut report = normalize_records(records, &code);
    progress.record(
        ProgressEvent::new(&code, "normalise", format!("{} manuscript(s) normalised", report.manuscripts.len()))
            .with_count(report.manuscripts.len()),
    );

    // ── 3. Pattern check ──────────────────────────────────────────────────────
    if !journal.patterns.is_empty() {
        let mut kept = Vec::with_capacity(report.manuscripts.len());
        for m in std::mem::take(&mut report.manuscripts) {
            if journal.matches_manuscript_id(&m.manuscript_id) {
                kept.push(m);
            } else if options.enforce_patterns {
                report.errors.push(
                    ItemError::new(ErrorKind::Validation, "ID matches none of the journal patterns")
                        .for_manuscript(m.manuscript_id.as_str()),
                );
            } else {
                report
                    .warnings
                    .push(format!("{}: ID matches none of the journal patterns", m.manuscript_id));
                kept.push(m);
            }
        }
        report.manuscripts = kept;
    }

    for e in &report.errors {
        contract.record_error(e.kind, e.to_string());
    }

    // ── 4. PDFs ───────────────────────────────────────────────────────────────
    if let Some(dir) = &options.pdf_dir {
        fetch_pending_pdfs(&mut pdfs, dir, journal.settings.timeout_secs, &mut contract).await;
        progress.record(ProgressEvent::new(
            &code,
            "pdf",
            format!("{}/{} PDF(s) stored", pdfs.iter().filter(|p| p.is_downloaded()).count(), pdfs.len()),
        ));
    }

    // ── 5. Result ─────────────────────────────────────────────────────────────
    if let Some(expected) = expected_manuscripts.or(journal.settings.expected_manuscripts) {
        contract = contract.with_expected_manuscripts(expected);
    }
    contract.complete_extraction();

    let mut result = contract.create_result(report.manuscripts, referees, pdfs);
    for w in report.warnings {
        result.add_warning(w);
    }

    info!(
        status = %result.status,
        score = result.quality_score.overall_score,
        duplicates = report.duplicates_removed,
        "Run finished"
    );
    progress.record(
        ProgressEvent::new(&code, "done", result.summary_line()).with_count(result.manuscripts.len()),
    );
    result
}

/// Download every record that names a URL but has neither a file nor an
/// error yet. Failures are recorded as download errors.
async fn fetch_pending_pdfs(
    pdfs: &mut [PdfRecord],
    dir: &std::path::Path,
    timeout_secs: u64,
    contract: &mut ExtractionContract,
) {
    let pending = |p: &PdfRecord| !p.is_downloaded() && p.error.is_none() && p.source_url.is_some();
    if !pdfs.iter().any(pending) {
        return;
    }
    let downloader = match PdfDownloader::new(dir, timeout_secs) {
        Ok(d) => d,
        Err(e) => {
            contract.record_error(ErrorKind::Configuration, format!("PDF downloader unavailable: {e}"));
            return;
        }
    };
    for record in pdfs.iter_mut().filter(|p| pending(p)) {
        let id = record.manuscript_id.clone().unwrap_or_default();
        let url = record.source_url.clone().unwrap_or_default();
        *record = downloader.download(&id, &url, None).await;
        if let Some(err) = &record.error {
            contract.record_error(ErrorKind::Download, format!("{id}: {err}"));
        }
    }
    contract.log_action(format!("PDFs fetched into {}", downloader.output_dir().display()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let opts: RunOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.minimum_quality_threshold, 0.7);
        assert!(!opts.enforce_patterns);
        assert!(opts.pdf_dir.is_none());
        assert_eq!(opts.constants, ScoringConstants::default());
    }
}
