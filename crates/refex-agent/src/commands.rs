//! Subcommand implementations. Each returns whether everything it looked
//! at passed, so `main` can pick the exit code.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use refex_common::{JournalRegistry, TracingProgress};
use refex_ingestion::{run_extraction, JsonFileSource};
use refex_quality::{ExtractionResult, Severity, ValidationResult};
use tracing::{error, info, warn};

use crate::config::Config;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Journal codes to process (default: every configured journal)
    pub codes: Vec<String>,

    /// Directory or file with extractor dumps
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory for `<CODE>_result.json` files
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Journal registry (YAML)
    #[arg(long)]
    pub journals: Option<PathBuf>,

    /// Raise every validation threshold
    #[arg(long)]
    pub strict: bool,

    /// Overall score required by both the run status and validation
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// A saved `<CODE>_result.json`
    pub file: PathBuf,

    #[arg(long)]
    pub strict: bool,

    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub struct CheckConfigArgs {
    #[arg(long)]
    pub journals: Option<PathBuf>,
}

fn load_registry(path: &Path) -> anyhow::Result<refex_common::journal_config::RegistryLoad> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("reading journal registry {}", path.display()))?;
    JournalRegistry::load_report(&yaml).with_context(|| format!("parsing {}", path.display()))
}

pub async fn run(config: &Config, args: RunArgs) -> anyhow::Result<bool> {
    let journals_path = args.journals.unwrap_or_else(|| config.paths.journals.clone());
    let load = load_registry(&journals_path)?;
    for (code, e) in &load.errors {
        warn!(journal = %code, "Journal skipped: {e}");
    }
    let registry = load.registry;

    let codes: Vec<String> = if args.codes.is_empty() {
        registry.codes().into_iter().map(str::to_string).collect()
    } else {
        args.codes
    };
    let input = args.input.unwrap_or_else(|| config.paths.input.clone());
    let output = args.output.unwrap_or_else(|| config.paths.output.clone());
    std::fs::create_dir_all(&output).with_context(|| format!("creating {}", output.display()))?;

    let mut options = config.run_options();
    if let Some(t) = args.threshold {
        options.minimum_quality_threshold = t;
    }
    let validator = config.validator(args.strict);
    let source = JsonFileSource::new(&input);
    let mut progress = TracingProgress;

    info!(journals = codes.len(), input = %input.display(), "Starting extraction runs");
    let mut all_valid = true;
    for code in &codes {
        let journal = match registry.get(code) {
            Ok(j) => j,
            Err(e) => {
                error!("{e}");
                all_valid = false;
                continue;
            }
        };

        let result = run_extraction(journal, &source, &options, &mut progress).await;
        let validation = validator.validate_extraction_result(&result, args.threshold);

        let path = output.join(format!("{}_result.json", journal.code()));
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;

        print_report(&result, &validation);
        all_valid &= validation.is_valid;
    }
    Ok(all_valid)
}

pub fn validate(config: &Config, args: ValidateArgs) -> anyhow::Result<bool> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let result = ExtractionResult::from_json_str(&text)
        .with_context(|| format!("{} is not an extraction result", args.file.display()))?;
    let validation = config
        .validator(args.strict)
        .validate_extraction_result(&result, args.threshold);
    print_report(&result, &validation);
    Ok(validation.is_valid)
}

pub fn check_config(config: &Config, args: CheckConfigArgs) -> anyhow::Result<bool> {
    let journals_path = args.journals.unwrap_or_else(|| config.paths.journals.clone());
    let load = load_registry(&journals_path)?;

    for journal in load.registry.iter() {
        let missing = journal.credentials.missing_env();
        println!(
            "{:<8} {:<18} {} pattern(s)  {}",
            journal.code(),
            journal.platform.as_str(),
            journal.patterns.len(),
            journal.name
        );
        if !missing.is_empty() {
            println!("         missing env: {}", missing.join(", "));
        }
    }
    for (code, e) in &load.errors {
        println!("{code:<8} INVALID  {e}");
    }
    println!("{} journal(s) ok, {} invalid", load.registry.len(), load.errors.len());
    Ok(load.errors.is_empty())
}

fn print_report(result: &ExtractionResult, validation: &ValidationResult) {
    println!("{}", result.summary_line());
    for issue in validation.issues.iter().filter(|i| i.severity != Severity::Info) {
        let tag = match issue.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
            Severity::Info => "INFO ",
        };
        println!("  {tag} {}", issue.message);
    }
    for r in &validation.recommendations {
        println!("  -> {r}");
    }
    println!("  {}", if validation.is_valid { "valid" } else { "INVALID" });
}
