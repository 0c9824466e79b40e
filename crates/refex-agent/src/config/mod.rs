//! Configuration loading for refex.
//! Reads refex.toml from `--config` / REFEX_CONFIG, or the current directory.
//! Every key has a default, so a missing default file is not an error.

use anyhow::{bail, Context};
use refex_ingestion::RunOptions;
use refex_quality::{QualityValidator, ScoringConstants, ValidationThresholds};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "refex.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub quality: QualityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Journal registry (YAML).
    #[serde(default = "default_journals_path")]
    pub journals: PathBuf,
    /// Directory holding one extractor dump per journal.
    #[serde(default = "default_input_dir")]
    pub input: PathBuf,
    /// Where `<CODE>_result.json` files are written.
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
    /// PDFs are only fetched when this is set.
    #[serde(default)]
    pub pdf_dir: Option<PathBuf>,
}

fn default_journals_path() -> PathBuf { PathBuf::from("config/journals.yaml") }
fn default_input_dir()     -> PathBuf { PathBuf::from("dumps") }
fn default_output_dir()    -> PathBuf { PathBuf::from("results") }

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            journals: default_journals_path(),
            input: default_input_dir(),
            output: default_output_dir(),
            pdf_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default = "default_minimum_quality_threshold")]
    pub minimum_quality_threshold: f64,
    #[serde(default)]
    pub strict_mode: bool,
    #[serde(default)]
    pub enforce_patterns: bool,
    #[serde(default)]
    pub constants: ScoringConstants,
    #[serde(default)]
    pub thresholds: ValidationThresholds,
}

fn default_minimum_quality_threshold() -> f64 { refex_quality::DEFAULT_MINIMUM_QUALITY_THRESHOLD }

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            minimum_quality_threshold: default_minimum_quality_threshold(),
            strict_mode: false,
            enforce_patterns: false,
            constants: ScoringConstants::default(),
            thresholds: ValidationThresholds::default(),
        }
    }
}


impl Config {
    /// Load from `path`, or from refex.toml when none is given. An explicit
    /// path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if explicit {
                bail!("Config file not found: {}", path.display());
            }
            debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let q = &self.quality;
        if !(0.0..=1.0).contains(&q.minimum_quality_threshold) {
            bail!("quality.minimum_quality_threshold must be within [0, 1], got {}", q.minimum_quality_threshold);
        }
        if !q.constants.validate() {
            bail!("quality.constants must be finite and non-negative");
        }
        let t = &q.thresholds;
        let all = [
            t.minimum_overall_score,
            t.minimum_manuscript_completeness,
            t.minimum_referee_completeness,
            t.minimum_pdf_success_rate,
            t.minimum_data_integrity,
        ];
        if all.iter().any(|v| !(0.0..=1.0).contains(v)) {
            bail!("quality.thresholds must all be within [0, 1]");
        }
        Ok(())
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            minimum_quality_threshold: self.quality.minimum_quality_threshold,
            constants: self.quality.constants.clone(),
            enforce_patterns: self.quality.enforce_patterns,
            pdf_dir: self.paths.pdf_dir.clone(),
        }
    }

    /// Strict mode is on when either the file or the command line asks for it.
    pub fn validator(&self, strict: bool) -> QualityValidator {
        QualityValidator::with_thresholds(self.quality.thresholds.clone(), strict || self.quality.strict_mode)
    }
}
