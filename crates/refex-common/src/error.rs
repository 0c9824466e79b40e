use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefexError {
    #[error("Referee name must contain a separator (\"Last, First\"): {0:?}")]
    InvalidRefereeName(String),

    #[error("Referee due date {due} precedes agreed date {agreed}")]
    DateOrder { agreed: NaiveDate, due: NaiveDate },

    #[error("Invalid manuscript: {0}")]
    InvalidManuscript(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid manuscript ID pattern {pattern:?} for {journal}: {source}")]
    InvalidPattern {
        journal: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Journal not configured: {0}")]
    UnknownJournal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RefexError {
    /// Category used when the error is recorded against an extraction run.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RefexError::InvalidRefereeName(_)
            | RefexError::DateOrder { .. }
            | RefexError::InvalidManuscript(_) => ErrorKind::Validation,
            RefexError::Config(_)
            | RefexError::InvalidPattern { .. }
            | RefexError::UnknownJournal(_)
            | RefexError::Yaml(_) => ErrorKind::Configuration,
            RefexError::MissingCredential(_) => ErrorKind::Authentication,
            RefexError::Serialization(_) => ErrorKind::Parsing,
            RefexError::Io(_) | RefexError::Other(_) => ErrorKind::Navigation,
        }
    }
}

/// Failure categories tracked across an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Authentication,
    Navigation,
    Parsing,
    Download,
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration  => "configuration",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Navigation     => "navigation",
            ErrorKind::Parsing        => "parsing",
            ErrorKind::Download       => "download",
            ErrorKind::Validation     => "validation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, RefexError>;
