/// Core entity types shared by the contract, validator and ingestion crates.
/// Constructors enforce the data-model invariants; deserialization goes
/// through the same constructors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{RefexError, Result};

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Editorial platform; selects the scraping strategy on the extractor side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// SIAM journals behind ORCID single sign-on.
    Siam,
    ScholarOne,
    EditorialManager,
    Msp,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Siam             => "siam",
            Platform::ScholarOne       => "scholar_one",
            Platform::EditorialManager => "editorial_manager",
            Platform::Msp              => "msp",
            Platform::Unknown          => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JournalParts")]
pub struct Journal {
    code: String,
    pub name: String,
    pub platform: Platform,
}

#[derive(Deserialize)]
struct JournalParts {
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    platform: Platform,
}

impl From<JournalParts> for Journal {
    fn from(p: JournalParts) -> Self {
        Journal::new(&p.code, p.name, p.platform)
    }
}

impl Journal {
    /// The code is always stored upper-cased.
    pub fn new(code: &str, name: impl Into<String>, platform: Platform) -> Self {
        Self {
            code: normalize_code(code),
            name: name.into(),
            platform,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Upper-cases a journal code. Whitespace is kept; callers reading codes
/// from files or the command line trim first.
pub fn normalize_code(code: &str) -> String {
    code.to_uppercase()
}

// ---------------------------------------------------------------------------
// Manuscript
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManuscriptStatus {
    Submitted,
    AwaitingRefereeAssignment,
    UnderReview,
    AwaitingDecision,
    RevisionRequested,
    Accepted,
    Rejected,
    Withdrawn,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ManuscriptStatus {
    /// Map a platform status label ("Awaiting Referee Reports", "Under
    /// Review", ...) onto a status. Unrecognised labels map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        let l = label.trim().to_lowercase();
        if l.is_empty() { return ManuscriptStatus::Unknown; }
        if l.contains("withdraw")                                      { ManuscriptStatus::Withdrawn }
        else if l.contains("reject")                                   { ManuscriptStatus::Rejected }
        else if l.contains("accept")                                   { ManuscriptStatus::Accepted }
        else if l.contains("revis")                                    { ManuscriptStatus::RevisionRequested }
        else if l.contains("decision") || l.contains("recommendation") { ManuscriptStatus::AwaitingDecision }
        else if l.contains("assign") || l.contains("selection")
            || l.contains("potential referee")                         { ManuscriptStatus::AwaitingRefereeAssignment }
        else if l.contains("review") || l.contains("report")           { ManuscriptStatus::UnderReview }
        else if l.contains("submit") || l.contains("new")              { ManuscriptStatus::Submitted }
        else                                                           { ManuscriptStatus::Unknown }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub is_corresponding: bool,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Manuscript {
    pub manuscript_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub status: ManuscriptStatus,
    #[serde(default)]
    pub submission_date: Option<NaiveDate>,
    #[serde(default)]
    pub decision_date: Option<NaiveDate>,
    #[serde(default)]
    pub referees: Vec<Referee>,
    #[serde(default)]
    pub journal_code: String,
    #[serde(default)]
    pub pdf_path: Option<PathBuf>,
}

impl Manuscript {
    pub fn new(manuscript_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            manuscript_id: manuscript_id.into().trim().to_string(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Assign the manuscript to a journal; the code is upper-cased.
    pub fn with_journal(mut self, code: &str) -> Self {
        self.journal_code = normalize_code(code);
        self
    }

    pub fn has_id(&self) -> bool {
        !self.manuscript_id.trim().is_empty()
    }

    /// Submission date present and every referee's dates complete.
    pub fn has_complete_dates(&self) -> bool {
        self.submission_date.is_some() && self.referees.iter().all(|r| r.dates.is_complete())
    }
}

// ---------------------------------------------------------------------------
// Referee
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefereeStatus {
    Invited,
    Agreed,
    Declined,
    Completed,
    Overdue,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RefereeStatus {
    pub fn from_label(label: &str) -> Self {
        let l = label.trim().to_lowercase();
        if l.contains("overdue") || l.contains("late")                           { RefereeStatus::Overdue }
        else if l.contains("declin") || l.contains("unavailable")                { RefereeStatus::Declined }
        else if l.contains("complet") || l.contains("returned") || l.contains("received") { RefereeStatus::Completed }
        else if l.contains("agree") || l.contains("accepted")                    { RefereeStatus::Agreed }
        else if l.contains("invit") || l.contains("contacted")                   { RefereeStatus::Invited }
        else                                                                     { RefereeStatus::Unknown }
    }
}

/// Referee milestone dates. Fields are private so that the
/// `agreed <= due` ordering always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "DateParts")]
pub struct RefereeDates {
    invited: Option<NaiveDate>,
    agreed: Option<NaiveDate>,
    declined: Option<NaiveDate>,
    due: Option<NaiveDate>,
    completed: Option<NaiveDate>,
}

/// Unvalidated referee dates, as scraped.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateParts {
    #[serde(default)]
    pub invited: Option<NaiveDate>,
    #[serde(default)]
    pub agreed: Option<NaiveDate>,
    #[serde(default)]
    pub declined: Option<NaiveDate>,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub completed: Option<NaiveDate>,
}

impl TryFrom<DateParts> for RefereeDates {
    type Error = RefexError;

    fn try_from(p: DateParts) -> Result<Self> {
        let dates = RefereeDates::new(p.agreed, p.due)?;
        Ok(RefereeDates {
            invited: p.invited,
            declined: p.declined,
            completed: p.completed,
            ..dates
        })
    }
}

impl RefereeDates {
    pub fn new(agreed: Option<NaiveDate>, due: Option<NaiveDate>) -> Result<Self> {
        if let (Some(agreed), Some(due)) = (agreed, due) {
            if due < agreed {
                return Err(RefexError::DateOrder { agreed, due });
            }
        }
        Ok(Self { agreed, due, ..Default::default() })
    }

    pub fn with_invited(mut self, date: NaiveDate) -> Self {
        self.invited = Some(date);
        self
    }

    pub fn with_declined(mut self, date: NaiveDate) -> Self {
        self.declined = Some(date);
        self
    }

    pub fn with_completed(mut self, date: NaiveDate) -> Self {
        self.completed = Some(date);
        self
    }

    pub fn invited(&self) -> Option<NaiveDate> { self.invited }
    pub fn agreed(&self) -> Option<NaiveDate> { self.agreed }
    pub fn declined(&self) -> Option<NaiveDate> { self.declined }
    pub fn due(&self) -> Option<NaiveDate> { self.due }
    pub fn completed(&self) -> Option<NaiveDate> { self.completed }

    /// Invitation date known and the referee has answered.
    pub fn is_complete(&self) -> bool {
        self.invited.is_some() && (self.agreed.is_some() || self.declined.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Accept,
    MinorRevision,
    MajorRevision,
    Reject,
    Other(String),
}

impl Recommendation {
    pub fn from_label(label: &str) -> Self {
        let l = label.trim().to_lowercase();
        if l.contains("minor")       { Recommendation::MinorRevision }
        else if l.contains("major")  { Recommendation::MajorRevision }
        else if l.contains("reject") { Recommendation::Reject }
        else if l.contains("accept") { Recommendation::Accept }
        else                         { Recommendation::Other(label.trim().to_string()) }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefereeReport {
    #[serde(default)]
    pub pdf_path: Option<PathBuf>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RefereeParts")]
pub struct Referee {
    name: String,
    pub email: Option<String>,
    pub institution: Option<String>,
    pub status: RefereeStatus,
    pub dates: RefereeDates,
    pub report: Option<RefereeReport>,
}

#[derive(Deserialize)]
struct RefereeParts {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    institution: Option<String>,
    #[serde(default)]
    status: RefereeStatus,
    #[serde(default)]
    dates: RefereeDates,
    #[serde(default)]
    report: Option<RefereeReport>,
}

impl TryFrom<RefereeParts> for Referee {
    type Error = RefexError;

    fn try_from(p: RefereeParts) -> Result<Self> {
        let mut referee = Referee::new(p.name)?;
        referee.email = p.email;
        referee.institution = p.institution;
        referee.status = p.status;
        referee.dates = p.dates;
        referee.report = p.report;
        Ok(referee)
    }
}

impl Referee {
    /// Names are expected as "Last, First"; anything without a comma is
    /// rejected.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        if !name.contains(',') {
            return Err(RefexError::InvalidRefereeName(name));
        }
        Ok(Self {
            name,
            email: None,
            institution: None,
            status: RefereeStatus::Unknown,
            dates: RefereeDates::default(),
            report: None,
        })
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_status(mut self, status: RefereeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_dates(mut self, dates: RefereeDates) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_report(mut self, report: RefereeReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// PDF attempts
// ---------------------------------------------------------------------------

/// Outcome of one PDF download attempt. `path` is set iff the file was saved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfRecord {
    #[serde(default)]
    pub manuscript_id: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub page_count: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PdfRecord {
    pub fn downloaded(manuscript_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            manuscript_id: Some(manuscript_id.into()),
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn failed(manuscript_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            manuscript_id: Some(manuscript_id.into()),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn is_downloaded(&self) -> bool {
        self.path.is_some()
    }
}
