//! Run metadata: identity, timing, configuration snapshot and logs.

use chrono::{DateTime, Utc};
use refex_common::ErrorKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub at: DateTime<Utc>,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub run_id: Uuid,
    pub journal_code: String,
    pub journal_name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: f64,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub actions: Vec<ActionLogEntry>,
    #[serde(default)]
    pub errors: Vec<ErrorLogEntry>,
}

impl ExtractionMetadata {
    pub fn new(journal_code: &str, journal_name: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            journal_code: journal_code.to_string(),
            journal_name: journal_name.to_string(),
            started_at: None,
            completed_at: None,
            duration_seconds: 0.0,
            config: serde_json::Value::Null,
            actions: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn log_action(&mut self, message: impl Into<String>) {
        self.actions.push(ActionLogEntry { at: Utc::now(), message: message.into() });
    }

    pub fn log_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.errors.push(ErrorLogEntry { at: Utc::now(), kind, message: message.into() });
    }
}
