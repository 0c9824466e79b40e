//! Replays extractor dumps from disk.
//!
//! A dump is either a bare array of manuscript records or a full object
//! with `manuscripts`, `referees`, `pdfs`, `errors` and
//! `expected_manuscripts`. When the source points at a directory, the
//! journal's dump is `<dir>/<CODE>.json` (or the lower-case file name).

use std::path::PathBuf;

use async_trait::async_trait;
use refex_common::{ErrorKind, JournalConfig};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{ManuscriptSource, SourceError};
use crate::models::{ManuscriptRecord, SourceOutput};

#[derive(Deserialize)]
#[serde(untagged)]
enum Dump {
    Records(Vec<ManuscriptRecord>),
    Full(SourceOutput),
}

impl From<Dump> for SourceOutput {
    fn from(dump: Dump) -> Self {
        match dump {
            Dump::Records(manuscripts) => SourceOutput { manuscripts, ..Default::default() },
            Dump::Full(output) => output,
        }
    }
}

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The dump file for `code`, if one exists.
    pub fn dump_path(&self, code: &str) -> Option<PathBuf> {
        if !self.path.is_dir() {
            return self.path.is_file().then(|| self.path.clone());
        }
        [format!("{code}.json"), format!("{}.json", code.to_lowercase())]
            .into_iter()
            .map(|name| self.path.join(name))
            .find(|p| p.is_file())
    }

    pub fn parse(text: &str) -> Result<SourceOutput, SourceError> {
        let dump: Dump = serde_json::from_str(text)?;
        Ok(dump.into())
    }
}

#[async_trait]
impl ManuscriptSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    #[instrument(skip(self, journal), fields(journal = %journal.code()))]
    async fn extract(&self, journal: &JournalConfig) -> Result<SourceOutput, SourceError> {
        let path = self.dump_path(journal.code()).ok_or_else(|| {
            SourceError::new(
                ErrorKind::Navigation,
                format!("no dump for {} under {}", journal.code(), self.path.display()),
            )
        })?;
        let text = tokio::fs::read_to_string(&path).await?;
        let output = Self::parse(&text)?;
        debug!(path = %path.display(), records = output.manuscripts.len(), "dump loaded");
        Ok(output)
    }
}
