//! Progress reporting for extraction runs.
//! Callers pass a sink down the call chain; nothing here is global.

use serde::Serialize;
use tracing::info;

/// One human-readable progress note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub journal_code: String,
    pub stage: String,
    pub message: String,
    pub manuscripts_found: usize,
}

impl ProgressEvent {
    pub fn new(journal_code: &str, stage: &str, message: impl Into<String>) -> Self {
        Self {
            journal_code: journal_code.to_string(),
            stage: stage.to_string(),
            message: message.into(),
            manuscripts_found: 0,
        }
    }

    pub fn with_count(mut self, manuscripts_found: usize) -> Self {
        self.manuscripts_found = manuscripts_found;
        self
    }
}

pub trait ProgressSink: Send {
    fn record(&mut self, event: ProgressEvent);
}

/// Discards every event.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn record(&mut self, _event: ProgressEvent) {}
}

/// Keeps events in memory, e.g. to attach them to a run summary.
#[derive(Debug, Default)]
pub struct MemoryProgress {
    pub events: Vec<ProgressEvent>,
}

impl ProgressSink for MemoryProgress {
    fn record(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

/// Forwards events to the tracing subscriber.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn record(&mut self, event: ProgressEvent) {
        info!(
            journal = %event.journal_code,
            stage = %event.stage,
            manuscripts = event.manuscripts_found,
            "{}", event.message
        );
    }
}
