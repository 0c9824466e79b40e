//! refex-common: Data model, errors, journal configuration and progress
//! reporting shared by every refex crate.

pub mod error;
pub mod entities;
pub mod journal_config;
pub mod progress;

// Re-export commonly used types
pub use entities::{
    Author, Journal, Manuscript, ManuscriptStatus, PdfRecord, Platform, Recommendation,
    Referee, RefereeDates, RefereeReport, RefereeStatus,
};
pub use error::{ErrorKind, RefexError, Result};
pub use journal_config::{CredentialRefs, JournalConfig, JournalRegistry, JournalSettings};
pub use progress::{MemoryProgress, NullProgress, ProgressEvent, ProgressSink, TracingProgress};
