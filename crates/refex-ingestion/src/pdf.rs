//! Manuscript PDF download and inspection.
//!
//! A download attempt never fails the run. Every attempt produces a
//! `PdfRecord`; `path` is set only when a real PDF was written to disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use refex_common::PdfRecord;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("response is not a PDF ({0} bytes)")]
    NotPdf(usize),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// What could be read from a stored PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfInfo {
    pub sha256: String,
    pub size_bytes: usize,
    pub page_count: Option<usize>,
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Hash the bytes and count pages. Page counting is best-effort; a PDF
/// lopdf cannot parse still gets a hash.
pub fn inspect_pdf(bytes: &[u8]) -> PdfInfo {
    let page_count = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => Some(doc.get_pages().len()),
        Err(e) => {
            debug!("page count unavailable: {e}");
            None
        }
    };
    PdfInfo { sha256: sha256_hex(bytes), size_bytes: bytes.len(), page_count }
}

/// Keep `[A-Za-z0-9._-]`, replace everything else with `_`, and make sure
/// the name ends in `.pdf`.
pub fn sanitize_filename(name: &str) -> String {
    let mut out: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    out = out.trim_start_matches('.').to_string();
    if out.is_empty() {
        out.push_str("manuscript");
    }
    if !out.to_lowercase().ends_with(".pdf") {
        out.push_str(".pdf");
    }
    out
}

pub struct PdfDownloader {
    client: reqwest::Client,
    output_dir: PathBuf,
}

impl PdfDownloader {
    pub fn new(output_dir: impl Into<PathBuf>, timeout_secs: u64) -> Result<Self, PdfError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("refex/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, output_dir: output_dir.into() })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetch `url` and store it as `filename` (defaults to the manuscript ID).
    #[instrument(skip(self), fields(dir = %self.output_dir.display()))]
    pub async fn download(&self, manuscript_id: &str, url: &str, filename: Option<&str>) -> PdfRecord {
        let mut record = match self.fetch(url).await {
            Ok(bytes) => self.store(manuscript_id, &bytes, filename),
            Err(e) => {
                warn!(manuscript = manuscript_id, "PDF download failed: {e}");
                PdfRecord::failed(manuscript_id, e.to_string())
            }
        };
        record.source_url = Some(url.to_string());
        record
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, PdfError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PdfError::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(resp.bytes().await?.to_vec())
    }

    /// Validate and write bytes that were obtained some other way.
    pub fn store(&self, manuscript_id: &str, bytes: &[u8], filename: Option<&str>) -> PdfRecord {
        match self.write(manuscript_id, bytes, filename) {
            Ok((path, info)) => {
                debug!(manuscript = manuscript_id, path = %path.display(), bytes = info.size_bytes, "PDF stored");
                let mut record = PdfRecord::downloaded(manuscript_id, path);
                record.sha256 = Some(info.sha256);
                record.page_count = info.page_count;
                record
            }
            Err(e) => {
                warn!(manuscript = manuscript_id, "PDF not stored: {e}");
                PdfRecord::failed(manuscript_id, e.to_string())
            }
        }
    }

    fn write(&self, manuscript_id: &str, bytes: &[u8], filename: Option<&str>) -> Result<(PathBuf, PdfInfo), PdfError> {
        if !is_pdf(bytes) {
            return Err(PdfError::NotPdf(bytes.len()));
        }
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(sanitize_filename(filename.unwrap_or(manuscript_id)));
        std::fs::write(&path, bytes)?;
        Ok((path, inspect_pdf(bytes)))
    }
}
