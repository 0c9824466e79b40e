//! Journal configuration.
//!
//! Journals are declared in a YAML file:
//!
//! ```yaml
//! journals:
//!   SICON:
//!     name: SIAM Journal on Control and Optimization
//!     platform: siam
//!     url: https://sicon.siam.org
//!     patterns: ['M\d{6}']
//!     credentials: { username_env: ORCID_EMAIL, password_env: ORCID_PASSWORD }
//!     settings: { timeout_secs: 45, lookback_days: 180 }
//! platforms:
//!   siam: { login: orcid }
//! ```
//!
//! Credentials are always environment-variable names, never secrets.

use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use crate::entities::{normalize_code, Journal, Platform};
use crate::error::{RefexError, Result};

// ── Journal entries ──────────────────────────────────────────────────────────

/// One `journals.<CODE>` entry as written in the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub platform: Platform,

    #[serde(default)]
    pub url: String,

    /// Dashboard categories the extractor walks (e.g. "Awaiting Reports").
    #[serde(default)]
    pub categories: Vec<String>,

    /// Regexes recognising this journal's manuscript IDs.
    #[serde(default)]
    pub patterns: Vec<String>,

    #[serde(default)]
    pub credentials: CredentialRefs,

    #[serde(default)]
    pub settings: JournalSettings,
}

/// Validated configuration for one journal.
#[derive(Debug, Clone, Serialize)]
pub struct JournalConfig {
    code: String,
    pub name: String,
    pub platform: Platform,
    pub url: String,
    pub categories: Vec<String>,
    pub patterns: Vec<String>,
    pub credentials: CredentialRefs,
    pub settings: JournalSettings,
    #[serde(skip)]
    compiled: Vec<Regex>,
}

impl JournalConfig {
    /// Programmatic construction without patterns. The code is upper-cased.
    pub fn new(code: &str, name: impl Into<String>, platform: Platform, url: impl Into<String>) -> Self {
        Self {
            code: normalize_code(code),
            name: name.into(),
            platform,
            url: url.into(),
            categories: Vec::new(),
            patterns: Vec::new(),
            credentials: CredentialRefs::default(),
            settings: JournalSettings::default(),
            compiled: Vec::new(),
        }
    }

    /// Validate a file entry: `name` and `url` are required and every
    /// pattern must compile.
    pub fn from_entry(code: &str, entry: JournalEntry) -> Result<Self> {
        let code = normalize_code(code.trim());
        if code.is_empty() {
            return Err(RefexError::Config("journal code must not be empty".to_string()));
        }
        if entry.name.trim().is_empty() {
            return Err(RefexError::Config(format!("{code}: missing required key 'name'")));
        }
        if entry.url.trim().is_empty() {
            return Err(RefexError::Config(format!("{code}: missing required key 'url'")));
        }

        let mut config = JournalConfig::new(&code, entry.name, entry.platform, entry.url);
        config.categories = entry.categories;
        config.credentials = entry.credentials;
        config.settings = entry.settings;
        config.with_patterns(entry.patterns)
    }

    /// Replace the manuscript-ID patterns, compiling each one.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            let re = Regex::new(pattern).map_err(|source| RefexError::InvalidPattern {
                journal: self.code.clone(),
                pattern: pattern.clone(),
                source,
            })?;
            compiled.push(re);
        }
        self.patterns = patterns;
        self.compiled = compiled;
        Ok(self)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn journal(&self) -> Journal {
        Journal::new(&self.code, self.name.clone(), self.platform)
    }

    /// True when the ID matches any pattern. No patterns accepts everything.
    pub fn matches_manuscript_id(&self, id: &str) -> bool {
        self.compiled.is_empty() || self.compiled.iter().any(|re| re.is_match(id))
    }

    /// All distinct manuscript IDs found in free text, in order of first
    /// appearance.
    pub fn find_manuscript_ids(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for re in &self.compiled {
            for m in re.find_iter(text) {
                let id = m.as_str().to_string();
                if !found.contains(&id) {
                    found.push(id);
                }
            }
        }
        found
    }
}

// ── Credentials ──────────────────────────────────────────────────────────────

/// Names of the environment variables holding a journal's login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialRefs {
    #[serde(default)]
    pub username_env: Option<String>,

    #[serde(default)]
    pub password_env: Option<String>,

    /// Additional indirections (e.g. `token_env` for 2FA mailboxes).
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Credentials resolved from the environment.
#[derive(Debug)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl CredentialRefs {
    /// Variables that are named in the config but absent from the
    /// environment.
    pub fn missing_env(&self) -> Vec<String> {
        self.username_env
            .iter()
            .chain(self.password_env.iter())
            .chain(self.extra.values())
            .filter(|name| std::env::var(name.as_str()).is_err())
            .cloned()
            .collect()
    }

    pub fn resolve(&self) -> Result<Credentials> {
        let read = |name: &String| {
            std::env::var(name).map_err(|_| RefexError::MissingCredential(name.clone()))
        };
        let username = self.username_env.as_ref().map(read).transpose()?;
        let password = self
            .password_env
            .as_ref()
            .map(read)
            .transpose()?
            .map(SecretString::from);
        Ok(Credentials { username, password })
    }
}

// ── Settings ─────────────────────────────────────────────────────────────────

/// Free-form extraction tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// How far back to look for manuscripts, in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Expected manuscript count, when the dashboard advertises one.
    #[serde(default)]
    pub expected_manuscripts: Option<usize>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn default_timeout_secs() -> u64 { 30 }
fn default_retry_count() -> u32 { 3 }
fn default_lookback_days() -> u32 { 365 }

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            lookback_days: default_lookback_days(),
            expected_manuscripts: None,
            extra: BTreeMap::new(),
        }
    }
}

// ── Platforms ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    Orcid,
    #[default]
    Password,
    None,
}

/// One `platforms.<platform>` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub login: LoginMethod,

    #[serde(flatten)]
    pub settings: BTreeMap<String, serde_yaml::Value>,
}

// ── Registry ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    journals: BTreeMap<String, JournalEntry>,
    #[serde(default)]
    platforms: BTreeMap<String, PlatformConfig>,
}

/// All configured journals, keyed by upper-cased code.
#[derive(Debug, Clone, Default)]
pub struct JournalRegistry {
    journals: BTreeMap<String, JournalConfig>,
    platforms: BTreeMap<String, PlatformConfig>,
}

/// A registry plus the journals that failed validation. A bad journal
/// does not prevent the others from loading.
#[derive(Debug)]
pub struct RegistryLoad {
    pub registry: JournalRegistry,
    pub errors: Vec<(String, RefexError)>,
}

impl JournalRegistry {
    /// Parse and validate; per-journal failures are collected.
    /// A malformed document is still a hard error.
    pub fn load_report(yaml: &str) -> Result<RegistryLoad> {
        let file: RegistryFile = serde_yaml::from_str(yaml)?;
        let mut registry = JournalRegistry {
            journals: BTreeMap::new(),
            platforms: file.platforms,
        };
        let mut errors = Vec::new();

        for (raw_code, entry) in file.journals {
            let code = normalize_code(raw_code.trim());
            if registry.journals.contains_key(&code) {
                errors.push((
                    code.clone(),
                    RefexError::Config(format!("{code}: declared more than once")),
                ));
                continue;
            }
            match JournalConfig::from_entry(&code, entry) {
                Ok(config) => {
                    registry.journals.insert(code, config);
                }
                Err(e) => {
                    warn!(journal = %code, "Skipping journal: {e}");
                    errors.push((code, e));
                }
            }
        }

        Ok(RegistryLoad { registry, errors })
    }

    /// Parse and validate; the first invalid journal fails the whole load.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let load = Self::load_report(yaml)?;
        match load.errors.into_iter().next() {
            Some((_, e)) => Err(e),
            None => Ok(load.registry),
        }
    }

    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn insert(&mut self, config: JournalConfig) {
        self.journals.insert(config.code().to_string(), config);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, code: &str) -> Result<&JournalConfig> {
        let code = normalize_code(code.trim());
        self.journals
            .get(&code)
            .ok_or(RefexError::UnknownJournal(code))
    }

    pub fn codes(&self) -> Vec<&str> {
        self.journals.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JournalConfig> {
        self.journals.values()
    }

    pub fn len(&self) -> usize {
        self.journals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.journals.is_empty()
    }

    pub fn platform_for(&self, code: &str) -> Option<&PlatformConfig> {
        let journal = self.get(code).ok()?;
        self.platforms.get(journal.platform.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
journals:
  sicon:
    name: SIAM Journal on Control and Optimization
    platform: siam
    url: https://sicon.siam.org
    categories: ["Under Review", "Awaiting Referee Assignment"]
    patterns: ['M\d{6}']
    credentials:
      username_env: REFEX_TEST_ORCID_EMAIL
      password_env: REFEX_TEST_ORCID_PASSWORD
    settings:
      timeout_secs: 45
      headless: true
  MF:
    name: Mathematical Finance
    platform: scholar_one
    url: https://mc.manuscriptcentral.com/mafi
    patterns: ['MAFI-\d{4}-\d{4}(\.R\d+)?']
platforms:
  siam:
    login: orcid
    base_url: https://orcid.org
"#;

    #[test]
    fn test_codes_are_uppercased() {
        let registry = JournalRegistry::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(registry.codes(), vec!["MF", "SICON"]);
        assert_eq!(registry.get("sicon").unwrap().code(), "SICON");
        assert_eq!(registry.get(" sicon ").unwrap().code(), "SICON");
        assert_eq!(JournalConfig::new("fs", "Finance and Stochastics", Platform::EditorialManager, "x").code(), "FS");
    }

    #[test]
    fn test_settings_defaults_and_extras() {
        let registry = JournalRegistry::from_yaml_str(SAMPLE).unwrap();
        let sicon = registry.get("SICON").unwrap();
        assert_eq!(sicon.settings.timeout_secs, 45);
        assert_eq!(sicon.settings.retry_count, 3);
        assert_eq!(sicon.settings.extra.get("headless"), Some(&serde_yaml::Value::Bool(true)));
        assert_eq!(sicon.categories.len(), 2);
    }

    #[test]
    fn test_platform_lookup() {
        let registry = JournalRegistry::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(registry.platform_for("sicon").unwrap().login, LoginMethod::Orcid);
        assert!(registry.platform_for("MF").is_none());
    }

    #[test]
    fn test_manuscript_id_patterns() {
        let registry = JournalRegistry::from_yaml_str(SAMPLE).unwrap();
        let mf = registry.get("MF").unwrap();
        assert!(mf.matches_manuscript_id("MAFI-2024-0123.R1"));
        assert!(!mf.matches_manuscript_id("M123456"));
        assert_eq!(
            mf.find_manuscript_ids("Re: MAFI-2024-0123 and MAFI-2024-0099, again MAFI-2024-0123"),
            vec!["MAFI-2024-0123", "MAFI-2024-0099"]
        );
    }

    #[test]
    fn test_no_patterns_accepts_everything() {
        let config = JournalConfig::new("jota", "JOTA", Platform::EditorialManager, "https://www.editorialmanager.com/jota");
        assert!(config.matches_manuscript_id("anything"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let yaml = "journals:\n  NACO:\n    name: NACO\n    url: https://x\n    patterns: ['(unclosed']\n";
        let err = JournalRegistry::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, RefexError::InvalidPattern { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_bad_journal_does_not_block_others() {
        let yaml = "journals:\n  NACO:\n    name: NACO\n  FS:\n    name: FS\n    url: https://fs\n";
        let load = JournalRegistry::load_report(yaml).unwrap();
        assert_eq!(load.registry.codes(), vec!["FS"]);
        assert_eq!(load.errors.len(), 1);
        assert_eq!(load.errors[0].0, "NACO");
    }

    #[test]
    fn test_duplicate_codes_differing_in_case() {
        let yaml = "journals:\n  fs:\n    name: a\n    url: u\n  FS:\n    name: b\n    url: u\n";
        let load = JournalRegistry::load_report(yaml).unwrap();
        assert_eq!(load.registry.len(), 1);
        assert_eq!(load.errors.len(), 1);
    }

    #[test]
    fn test_unknown_journal() {
        let registry = JournalRegistry::from_yaml_str(SAMPLE).unwrap();
        assert!(matches!(registry.get("XYZ"), Err(RefexError::UnknownJournal(_))));
    }

    #[test]
    fn test_credentials_resolve_from_env() {
        std::env::set_var("REFEX_TEST_RESOLVE_USER", "editor@uni.edu");
        std::env::set_var("REFEX_TEST_RESOLVE_PASS", "hunter2");
        let refs = CredentialRefs {
            username_env: Some("REFEX_TEST_RESOLVE_USER".to_string()),
            password_env: Some("REFEX_TEST_RESOLVE_PASS".to_string()),
            extra: BTreeMap::new(),
        };
        let creds = refs.resolve().unwrap();
        assert_eq!(creds.username.as_deref(), Some("editor@uni.edu"));
        assert_eq!(creds.password.unwrap().expose_secret(), "hunter2");
        assert!(refs.missing_env().is_empty());
    }

    #[test]
    fn test_missing_credential() {
        let refs = CredentialRefs {
            username_env: None,
            password_env: Some("REFEX_TEST_DEFINITELY_UNSET".to_string()),
            extra: BTreeMap::new(),
        };
        assert!(matches!(refs.resolve(), Err(RefexError::MissingCredential(_))));
        assert_eq!(refs.missing_env(), vec!["REFEX_TEST_DEFINITELY_UNSET".to_string()]);
    }
}
