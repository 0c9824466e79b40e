//! Fixture builders shared by refex tests.

use std::path::PathBuf;

use chrono::NaiveDate;
use refex_common::{
    Author, Manuscript, ManuscriptStatus, Referee, RefereeDates, RefereeReport, RefereeStatus,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

/// A referee named "Last, First". Panics on a malformed fixture name.
pub fn referee(name: &str) -> Referee {
    Referee::new(name).expect("fixture referee names contain a comma")
}

pub fn referee_with_email(name: &str, email: &str) -> Referee {
    referee(name).with_email(email)
}

/// Agreed referee with invited/agreed/due dates filled in.
pub fn dated_referee(name: &str, email: &str) -> Referee {
    let dates = RefereeDates::new(Some(date(2024, 3, 4)), Some(date(2024, 5, 4)))
        .expect("fixture dates are ordered")
        .with_invited(date(2024, 3, 1));
    referee_with_email(name, email)
        .with_status(RefereeStatus::Agreed)
        .with_dates(dates)
}

pub struct ManuscriptBuilder {
    manuscript: Manuscript,
}

impl ManuscriptBuilder {
    pub fn new(id: &str) -> Self {
        Self { manuscript: Manuscript::new(id, format!("Manuscript {id}")) }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.manuscript.title = title.to_string();
        self
    }

    pub fn journal(mut self, code: &str) -> Self {
        self.manuscript = self.manuscript.with_journal(code);
        self
    }

    pub fn author(mut self, name: &str) -> Self {
        self.manuscript.authors.push(Author::new(name));
        self
    }

    pub fn status(mut self, status: ManuscriptStatus) -> Self {
        self.manuscript.status = status;
        self
    }

    pub fn submitted(mut self, on: NaiveDate) -> Self {
        self.manuscript.submission_date = Some(on);
        self
    }

    pub fn referee(mut self, referee: Referee) -> Self {
        self.manuscript.referees.push(referee);
        self
    }

    pub fn reviewed_by(self, name: &str, email: &str) -> Self {
        self.referee(referee_with_email(name, email))
    }

    pub fn with_report(mut self, text: &str) -> Self {
        if let Some(last) = self.manuscript.referees.pop() {
            self.manuscript.referees.push(last.with_report(RefereeReport {
                text: Some(text.to_string()),
                ..Default::default()
            }));
        }
        self
    }

    pub fn pdf(mut self, path: &str) -> Self {
        self.manuscript.pdf_path = Some(PathBuf::from(path));
        self
    }

    pub fn build(self) -> Manuscript {
        self.manuscript
    }
}

/// `n` well-formed manuscripts, each with one emailed, fully dated referee.
pub fn complete_manuscripts(journal: &str, n: usize) -> Vec<Manuscript> {
    (1..=n)
        .map(|i| {
            ManuscriptBuilder::new(&format!("{journal}-2024-{i:04}"))
                .journal(journal)
                .author("Ada Lovelace")
                .status(ManuscriptStatus::UnderReview)
                .submitted(date(2024, 2, 1))
                .referee(dated_referee("Noether, Emmy", &format!("ref{i}@uni.edu")))
                .build()
        })
        .collect()
}

/// A heterogeneous extractor record in the "mapping" shape.
pub fn mapping_record(id: &str, referees: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "Manuscript #": id,
        "Title": format!("Title of {id}"),
        "Status": "Under Review",
        "Submitted": "12-Mar-2024",
        "Referees": referees,
    })
}
