//! Extraction runs from source output to a validated result.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use refex_common::{ErrorKind, JournalConfig, MemoryProgress, NullProgress, PdfRecord, Platform};
use refex_ingestion::{
    run_extraction, JsonFileSource, ManuscriptSource, RunOptions, SourceError, SourceOutput,
    StaticSource,
};
use refex_quality::{ExtractionStatus, QualityValidator, ValidationRule};
use refex_test_utils::mapping_record;
use serde_json::json;

fn sicon() -> JournalConfig {
    JournalConfig::new("sicon", "SIAM J. Control Optim.", Platform::Siam, "https://sicon.siam.org")
        .with_patterns([r"^SICON-\d{4}-\d{4}$"])
        .unwrap()
}

struct RefusingSource;

#[async_trait]
impl ManuscriptSource for RefusingSource {
    fn name(&self) -> &str {
        "refusing"
    }

    async fn extract(&self, _journal: &JournalConfig) -> Result<SourceOutput, SourceError> {
        Err(SourceError::new(ErrorKind::Authentication, "login refused"))
    }
}

#[tokio::test]
async fn dump_with_emailed_referees_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let dump = json!([
        mapping_record("SICON-2024-0001", json!(["Doe, Jane <jane@uni.edu>"])),
        mapping_record("SICON-2024-0002", json!([{"Name": "Emmy Noether", "Email": "en@uni.edu"}])),
    ]);
    std::fs::write(dir.path().join("SICON.json"), dump.to_string()).unwrap();

    let result = run_extraction(
        &sicon(),
        &JsonFileSource::new(dir.path()),
        &RunOptions::default(),
        &mut NullProgress,
    )
    .await;

    assert_eq!(result.status, ExtractionStatus::Success);
    assert_eq!(result.manuscript_ids(), vec!["SICON-2024-0001", "SICON-2024-0002"]);
    assert_eq!(result.metrics.total_referees_found, 2);
    assert_eq!(result.metrics.total_referees_with_emails, 2);
    assert!((result.quality_score.overall_score - 0.85).abs() < 1e-9);
    assert!(result.manuscripts.iter().all(|m| m.journal_code == "SICON"));

    let validation = QualityValidator::new(false).validate_extraction_result(&result, None);
    assert!(validation.is_valid);
}

#[tokio::test]
async fn refused_login_fails_the_run() {
    let result = run_extraction(&sicon(), &RefusingSource, &RunOptions::default(), &mut NullProgress).await;

    assert_eq!(result.status, ExtractionStatus::Failed);
    assert_eq!(result.metrics.authentication_errors, 1);
    assert!(result.errors.iter().any(|e| e == "[authentication] login refused"));
    assert!(result.errors.iter().any(|e| e.contains("No manuscripts extracted for SICON")));

    let validation = QualityValidator::new(false).validate_extraction_result(&result, None);
    assert!(!validation.is_valid);
    assert!(validation.has_issue(ValidationRule::ExtractionFailed));
    assert!(validation.recommendations.iter().any(|r| r == "Retry with credentials refreshed"));
}

#[tokio::test]
async fn foreign_ids_warn_or_drop() {
    let records = vec![
        mapping_record("SICON-2024-0001", json!(["Doe, Jane"])),
        mapping_record("MAFI-2024-0001", json!(["Roe, Richard"])),
    ];
    let output: SourceOutput = serde_json::from_value(json!({ "manuscripts": records })).unwrap();
    let source = StaticSource::new(output);

    let lenient = run_extraction(&sicon(), &source, &RunOptions::default(), &mut NullProgress).await;
    assert_eq!(lenient.manuscripts.len(), 2);
    assert!(lenient.warnings.iter().any(|w| w.starts_with("MAFI-2024-0001")));

    let options = RunOptions { enforce_patterns: true, ..Default::default() };
    let strict = run_extraction(&sicon(), &source, &options, &mut NullProgress).await;
    assert_eq!(strict.manuscript_ids(), vec!["SICON-2024-0001"]);
    assert_eq!(strict.metrics.parsing_errors, 1);
    assert!(strict.quality_score.parsing_issues);
    assert!(!lenient.quality_score.parsing_issues);
}

#[tokio::test]
async fn advertised_count_limits_completeness() {
    let output: SourceOutput = serde_json::from_value(json!({
        "manuscripts": [
            mapping_record("SICON-2024-0001", json!([])),
            mapping_record("SICON-2024-0002", json!([])),
        ],
        "expected_manuscripts": 4
    }))
    .unwrap();

    let result = run_extraction(&sicon(), &StaticSource::new(output), &RunOptions::default(), &mut NullProgress).await;

    assert!((result.quality_score.manuscript_completeness - 0.5).abs() < 1e-9);
    assert!(result.warnings.iter().any(|w| w == "No referees found"));
}

#[tokio::test]
async fn failed_pdf_fetch_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let output = SourceOutput {
        manuscripts: vec![serde_json::from_value(mapping_record("SICON-2024-0001", json!(["Doe, Jane"]))).unwrap()],
        pdfs: vec![PdfRecord {
            manuscript_id: Some("SICON-2024-0001".into()),
            source_url: Some("http://127.0.0.1:9/SICON-2024-0001.pdf".into()),
            ..Default::default()
        }],
        ..Default::default()
    };
    let options = RunOptions { pdf_dir: Some(dir.path().to_path_buf()), ..Default::default() };

    let result = run_extraction(&sicon(), &StaticSource::new(output), &options, &mut NullProgress).await;

    assert_eq!(result.metrics.total_pdfs_attempted, 1);
    assert_eq!(result.metrics.total_pdfs_downloaded, 0);
    assert_eq!(result.metrics.download_errors, 1);
    assert!(result.warnings.iter().any(|w| w == "1 of 1 PDF download(s) failed"));
}

#[tokio::test]
async fn progress_follows_the_run() {
    let mut progress = MemoryProgress::default();
    let output: SourceOutput =
        serde_json::from_value(json!({ "manuscripts": [mapping_record("SICON-2024-0001", json!([]))] })).unwrap();

    run_extraction(&sicon(), &StaticSource::new(output), &RunOptions::default(), &mut progress).await;

    let stages: Vec<&str> = progress.events.iter().map(|e| e.stage.as_str()).collect();
    assert_eq!(stages, vec!["extract", "normalise", "done"]);
    assert_eq!(progress.events[2].manuscripts_found, 1);
}

#[tokio::test]
async fn duplicate_ids_keep_the_first_record() {
    let output: SourceOutput = serde_json::from_value(json!({
        "manuscripts": [
            {"manuscript_id": "DUP-1", "title": "first"},
            {"Manuscript #": "DUP-1", "Title": "second"},
        ]
    }))
    .unwrap();
    let journal = JournalConfig::new("x", "Example", Platform::Unknown, "https://example.org");

    let result = run_extraction(&journal, &StaticSource::new(output), &RunOptions::default(), &mut NullProgress).await;

    assert_eq!(result.manuscript_ids(), vec!["DUP-1"]);
    assert_eq!(result.manuscripts[0].title, "first");
    assert_eq!(result.quality_score.data_integrity, 1.0);
    assert!(result.warnings.iter().any(|w| w.contains("duplicate manuscript DUP-1")));
}

#[tokio::test]
async fn label_columns_beside_a_typed_id_are_kept() {
    let output: SourceOutput = serde_json::from_value(json!({
        "manuscripts": [{
            "manuscript_id": "SICON-2024-0001",
            "Title": "Paper",
            "Referees": ["Doe, Jane <jd@uni.edu>"],
            "Submitted": "12-Mar-2024"
        }]
    }))
    .unwrap();

    let result = run_extraction(&sicon(), &StaticSource::new(output), &RunOptions::default(), &mut NullProgress).await;

    let m = &result.manuscripts[0];
    assert_eq!(m.title, "Paper");
    assert_eq!(m.referees.len(), 1);
    assert_eq!(m.submission_date, chrono::NaiveDate::from_ymd_opt(2024, 3, 12));
    assert_eq!(result.metrics.total_referees_with_emails, 1);
}

#[tokio::test]
async fn inverted_nested_dates_are_repaired_with_a_warning() {
    let output: SourceOutput = serde_json::from_value(json!({
        "manuscripts": [{
            "manuscript_id": "SICON-2024-0001",
            "referees": [{"name": "Doe, Jane",
                          "dates": {"invited": "2024-01-01", "agreed": "2024-03-10", "due": "2024-03-01"}}]
        }]
    }))
    .unwrap();

    let result = run_extraction(&sicon(), &StaticSource::new(output), &RunOptions::default(), &mut NullProgress).await;

    let dates = result.manuscripts[0].referees[0].dates;
    assert!(dates.invited().is_some());
    assert!(dates.agreed().is_some());
    assert_eq!(dates.due(), None);
    assert!(result.warnings.iter().any(|w| w.contains("due date dropped")));
}
