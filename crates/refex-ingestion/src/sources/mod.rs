//! Manuscript sources: anything that can hand over one journal's raw
//! extraction output.

pub mod json_file;

use async_trait::async_trait;
use refex_common::{ErrorKind, JournalConfig, RefexError};
use thiserror::Error;

use crate::models::SourceOutput;

pub use json_file::JsonFileSource;

/// Run-level failure of a source. Item-level problems travel inside
/// `SourceOutput::errors` instead.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct SourceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        let kind = match e.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorKind::Authentication,
            _ => ErrorKind::Navigation,
        };
        SourceError::new(kind, e.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::new(ErrorKind::Parsing, e.to_string())
    }
}

impl From<RefexError> for SourceError {
    fn from(e: RefexError) -> Self {
        SourceError::new(e.kind(), e.to_string())
    }
}

/// Common interface for all manuscript sources.
#[async_trait]
pub trait ManuscriptSource: Send + Sync {
    fn name(&self) -> &str;

    /// Extract everything the source has for one journal.
    async fn extract(&self, journal: &JournalConfig) -> Result<SourceOutput, SourceError>;
}

/// Serves a fixed output, regardless of journal. Useful for replaying a
/// captured run.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    output: SourceOutput,
}

impl StaticSource {
    pub fn new(output: SourceOutput) -> Self {
        Self { output }
    }
}

#[async_trait]
impl ManuscriptSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn extract(&self, _journal: &JournalConfig) -> Result<SourceOutput, SourceError> {
        Ok(self.output.clone())
    }
}
