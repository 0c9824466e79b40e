//! refex-ingestion: from extractor output to a scored run.
//! - Manuscript sources (extractor dumps, replayed outputs)
//! - Record normalisation (mapping adapter, dates, referee names)
//! - Deduplication
//! - PDF download and inspection
//! - The per-journal run orchestrator

pub mod dedup;
pub mod models;
pub mod normalise;
pub mod pdf;
pub mod pipeline;
pub mod sources;

pub use models::{ItemError, ManuscriptRecord, NormalizationReport, ReportedError, SourceOutput};
pub use normalise::normalize_records;
pub use pipeline::{run_extraction, RunOptions};
pub use sources::{JsonFileSource, ManuscriptSource, SourceError, StaticSource};
