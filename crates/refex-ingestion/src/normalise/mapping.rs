//! Adapters from extractor record shapes to the canonical `Manuscript`.

use std::path::PathBuf;

use chrono::NaiveDate;
use refex_common::entities::DateParts;
use refex_common::{
    Author, ErrorKind, Manuscript, ManuscriptStatus, Recommendation, Referee, RefereeDates,
    RefereeReport, RefereeStatus, RefexError,
};
use serde_json::{Map, Value};

use super::dates::parse_date;
use super::names::{extract_email, normalize_referee_name, split_name_and_email};
use crate::models::ItemError;

// Column labels, matched case-insensitively.
const ID_KEYS: &[&str] = &["Manuscript #", "Manuscript ID", "Manuscript Number", "manuscript_id", "id", "ms_id"];
const TITLE_KEYS: &[&str] = &["Title", "Manuscript Title"];
const AUTHOR_KEYS: &[&str] = &["Authors", "Author", "author_names"];
const STATUS_KEYS: &[&str] = &["Status", "Current Stage", "Manuscript Status"];
const SUBMITTED_KEYS: &[&str] = &["Submitted", "Submission Date", "Date Submitted", "submission_date"];
const DECISION_KEYS: &[&str] = &["Decision Date", "decision_date"];
const PDF_KEYS: &[&str] = &["PDF", "pdf_path", "Manuscript PDF"];
const REFEREE_KEYS: &[&str] = &["Referees", "Reviewers", "referees"];

const NAME_KEYS: &[&str] = &["Name", "Referee", "Reviewer", "Referee Name"];
const EMAIL_KEYS: &[&str] = &["Email", "E-mail", "Email Address"];
const INSTITUTION_KEYS: &[&str] = &["Institution", "Affiliation"];
const INVITED_KEYS: &[&str] = &["Invited", "Date Invited"];
const AGREED_KEYS: &[&str] = &["Agreed", "Date Agreed"];
const DECLINED_KEYS: &[&str] = &["Declined", "Date Declined"];
const DUE_KEYS: &[&str] = &["Due", "Due Date", "Date Due"];
const COMPLETED_KEYS: &[&str] = &["Completed", "Returned", "Date Returned", "Review Returned"];
const REPORT_KEYS: &[&str] = &["Report", "Report Text"];
const REPORT_PDF_KEYS: &[&str] = &["Report PDF", "report_pdf"];
const RECOMMENDATION_KEYS: &[&str] = &["Recommendation"];
// Nested objects of the typed referee shape.
const DATES_KEYS: &[&str] = &["dates"];
const REPORT_TEXT_KEYS: &[&str] = &["text", "Report Text"];
const NESTED_PDF_KEYS: &[&str] = &["pdf_path", "PDF"];

/// A canonical manuscript with the referees that had to be skipped and
/// any repairs made along the way.
#[derive(Debug)]
pub struct Adapted {
    pub manuscript: Manuscript,
    pub skipped: Vec<ItemError>,
    pub warnings: Vec<String>,
}

/// Typed manuscripts were validated on deserialization; only the ID is
/// checked here.
pub fn adapt_typed(mut manuscript: Manuscript) -> Result<Adapted, ItemError> {
    manuscript.manuscript_id = manuscript.manuscript_id.trim().to_string();
    if manuscript.manuscript_id.is_empty() {
        return Err(ItemError::new(ErrorKind::Parsing, "manuscript has an empty ID"));
    }
    Ok(Adapted { manuscript, skipped: Vec::new(), warnings: Vec::new() })
}

pub fn adapt_mapping(map: &Map<String, Value>) -> Result<Adapted, ItemError> {
    let id = text_field(map, ID_KEYS)
        .ok_or_else(|| ItemError::new(ErrorKind::Parsing, "record has no manuscript ID"))?;

    let mut warnings = Vec::new();
    let mut skipped = Vec::new();

    let mut m = Manuscript::new(id.as_str(), text_field(map, TITLE_KEYS).unwrap_or_default());
    m.authors = field(map, AUTHOR_KEYS).map(authors_from).unwrap_or_default();
    m.status = text_field(map, STATUS_KEYS)
        .map(|s| ManuscriptStatus::from_label(&s))
        .unwrap_or_default();
    m.submission_date = date_field(map, SUBMITTED_KEYS, &id, "submission", &mut warnings);
    m.decision_date = date_field(map, DECISION_KEYS, &id, "decision", &mut warnings);
    m.pdf_path = text_field(map, PDF_KEYS).map(PathBuf::from);

    if let Some(value) = field(map, REFEREE_KEYS) {
        for (i, entry) in referee_values(value).iter().enumerate() {
            match referee_from_value(entry, &id, &mut warnings) {
                Ok(r) => m.referees.push(r),
                Err(e) => skipped.push(
                    ItemError::new(e.kind(), format!("referee {} skipped: {e}", i + 1)).for_manuscript(id.as_str()),
                ),
            }
        }
    }

    Ok(Adapted { manuscript: m, skipped, warnings })
}

fn referee_values(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => s
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn referee_from_value(value: &Value, manuscript_id: &str, warnings: &mut Vec<String>) -> Result<Referee, RefexError> {
    match value {
        Value::String(s) => {
            let (name, email) = split_name_and_email(s);
            let referee = Referee::new(normalize_referee_name(&name)?)?;
            Ok(match email {
                Some(e) => referee.with_email(e),
                None => referee,
            })
        }
        Value::Object(o) => referee_from_object(o, manuscript_id, warnings),
        other => Err(RefexError::InvalidRefereeName(other.to_string())),
    }
}

fn referee_from_object(
    o: &Map<String, Value>,
    manuscript_id: &str,
    warnings: &mut Vec<String>,
) -> Result<Referee, RefexError> {
    let raw_name = text_field(o, NAME_KEYS).unwrap_or_default();
    let (name, inline_email) = split_name_and_email(&raw_name);
    let name = normalize_referee_name(&name)?;

    let mut referee = Referee::new(name.as_str())?;
    referee.email = text_field(o, EMAIL_KEYS)
        .and_then(|e| extract_email(&e))
        .or(inline_email);
    referee.institution = text_field(o, INSTITUTION_KEYS);

    let context = format!("{manuscript_id} / {name}");
    let nested = field(o, DATES_KEYS).and_then(Value::as_object);
    let parts = DateParts {
        invited: referee_date(o, nested, INVITED_KEYS, &context, "invited", warnings),
        agreed: referee_date(o, nested, AGREED_KEYS, &context, "agreed", warnings),
        declined: referee_date(o, nested, DECLINED_KEYS, &context, "declined", warnings),
        due: referee_date(o, nested, DUE_KEYS, &context, "due", warnings),
        completed: referee_date(o, nested, COMPLETED_KEYS, &context, "completed", warnings),
    };
    referee.dates = match RefereeDates::try_from(parts) {
        Ok(dates) => dates,
        Err(e) => {
            warnings.push(format!("{context}: due date dropped ({e})"));
            RefereeDates::try_from(DateParts { due: None, ..parts })?
        }
    };

    referee.status = match text_field(o, STATUS_KEYS) {
        Some(label) => RefereeStatus::from_label(&label),
        None => status_from_dates(&referee.dates),
    };

    let report = field(o, REPORT_KEYS).and_then(Value::as_object);
    let text = match report {
        Some(r) => text_field(r, REPORT_TEXT_KEYS),
        None => text_field(o, REPORT_KEYS),
    };
    let pdf_path = text_field(o, REPORT_PDF_KEYS)
        .or_else(|| report.and_then(|r| text_field(r, NESTED_PDF_KEYS)))
        .map(PathBuf::from);
    let recommendation = text_field(o, RECOMMENDATION_KEYS)
        .or_else(|| report.and_then(|r| text_field(r, RECOMMENDATION_KEYS)))
        .map(|r| Recommendation::from_label(&r));
    if text.is_some() || pdf_path.is_some() || recommendation.is_some() {
        referee.report = Some(RefereeReport { pdf_path, text, recommendation });
    }

    Ok(referee)
}

/// A referee date from a flat column, else from the nested `dates` object.
fn referee_date(
    o: &Map<String, Value>,
    nested: Option<&Map<String, Value>>,
    keys: &[&str],
    context: &str,
    label: &str,
    warnings: &mut Vec<String>,
) -> Option<NaiveDate> {
    match date_field(o, keys, context, label, warnings) {
        Some(date) => Some(date),
        None => nested.and_then(|n| date_field(n, keys, context, label, warnings)),
    }
}

fn status_from_dates(dates: &RefereeDates) -> RefereeStatus {
    if dates.completed().is_some() {
        RefereeStatus::Completed
    } else if dates.declined().is_some() {
        RefereeStatus::Declined
    } else if dates.agreed().is_some() {
        RefereeStatus::Agreed
    } else if dates.invited().is_some() {
        RefereeStatus::Invited
    } else {
        RefereeStatus::Unknown
    }
}

fn authors_from(value: &Value) -> Vec<Author> {
    match value {
        Value::Array(items) => items.iter().filter_map(author_from).collect(),
        Value::String(s) => {
            let parts: Vec<&str> = if s.contains(';') {
                s.split(';').collect()
            } else {
                s.split(" and ").collect()
            };
            parts
                .into_iter()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(Author::new)
                .collect()
        }
        _ => Vec::new(),
    }
}

fn author_from(value: &Value) -> Option<Author> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(Author::new(s.trim())),
        Value::Object(o) => {
            let name = text_field(o, &["Name", "name"])?;
            Some(Author {
                name,
                email: text_field(o, EMAIL_KEYS),
                institution: text_field(o, INSTITUTION_KEYS),
                is_corresponding: matches!(field(o, &["Corresponding", "is_corresponding"]), Some(Value::Bool(true))),
            })
        }
        _ => None,
    }
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| {
        map.iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(k))
            .map(|(_, v)| v)
    })
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(map, keys).and_then(text)
}

/// Parse a date column; an unreadable value is dropped with a warning.
fn date_field(
    map: &Map<String, Value>,
    keys: &[&str],
    context: &str,
    label: &str,
    warnings: &mut Vec<String>,
) -> Option<NaiveDate> {
    let raw = text_field(map, keys)?;
    let parsed = parse_date(&raw);
    if parsed.is_none() {
        warnings.push(format!("{context}: unreadable {label} date {raw:?}"));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_scholarone_style_record() {
        let map = obj(json!({
            "Manuscript #": "MAFI-2024-0042",
            "Title": "Optimal stopping with ambiguity",
            "Authors": "Smith, J.; Doe, A.",
            "Status": "Awaiting Referee Reports",
            "Submitted": "12-Mar-2024",
            "Referees": [
                {"Name": "Emmy Noether", "Email": "mailto:noether@uni.edu", "Invited": "13-Mar-2024",
                 "Agreed": "15-Mar-2024", "Due": "15-May-2024"},
                {"Name": "Hilbert, David", "Status": "Declined"}
            ]
        }));
        let a = adapt_mapping(&map).unwrap();
        let m = a.manuscript;
        assert_eq!(m.manuscript_id, "MAFI-2024-0042");
        assert_eq!(m.authors.len(), 2);
        assert_eq!(m.status, ManuscriptStatus::UnderReview);
        assert_eq!(m.submission_date, NaiveDate::from_ymd_opt(2024, 3, 12));
        assert_eq!(m.referees.len(), 2);
        assert_eq!(m.referees[0].name(), "Noether, Emmy");
        assert_eq!(m.referees[0].email.as_deref(), Some("noether@uni.edu"));
        assert_eq!(m.referees[0].status, RefereeStatus::Agreed);
        assert!(m.referees[0].dates.is_complete());
        assert_eq!(m.referees[1].status, RefereeStatus::Declined);
        assert!(a.skipped.is_empty());
        assert!(a.warnings.is_empty());
    }

    #[test]
    fn test_string_referees_with_inline_email() {
        let map = obj(json!({
            "id": 1234,
            "Referees": "Smith, John <js@uni.edu>; Jane Roe"
        }));
        let m = adapt_mapping(&map).unwrap().manuscript;
        assert_eq!(m.manuscript_id, "1234");
        assert_eq!(m.referees[0].email.as_deref(), Some("js@uni.edu"));
        assert_eq!(m.referees[1].name(), "Roe, Jane");
    }

    #[test]
    fn test_bad_referee_skipped_not_fatal() {
        let map = obj(json!({"Manuscript ID": "M1", "Referees": ["Plato", "Doe, Jane"]}));
        let a = adapt_mapping(&map).unwrap();
        assert_eq!(a.manuscript.referees.len(), 1);
        assert_eq!(a.skipped.len(), 1);
        assert_eq!(a.skipped[0].kind, ErrorKind::Validation);
        assert_eq!(a.skipped[0].manuscript_id.as_deref(), Some("M1"));
    }

    #[test]
    fn test_nameless_referee_is_skipped_named_one_kept() {
        let a = adapt_mapping(&obj(json!({"id": "X-1", "referees": [{"email": "a@b.com"}]}))).unwrap();
        assert!(a.manuscript.referees.is_empty());
        assert_eq!(a.skipped[0].kind, ErrorKind::Validation);

        let a = adapt_mapping(&obj(json!({"id": "X-1", "referees": [{"name": "Bee, Alice", "email": "a@b.com"}]})))
            .unwrap();
        assert!(a.manuscript.referees[0].has_email());
    }

    #[test]
    fn test_missing_id_is_parsing_error() {
        let err = adapt_mapping(&obj(json!({"Title": "Orphan"}))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parsing);
    }

    #[test]
    fn test_inverted_due_date_is_dropped() {
        let map = obj(json!({
            "Manuscript #": "M1",
            "Referees": [{"Name": "Doe, Jane", "Agreed": "2024-03-10", "Due": "2024-03-01"}]
        }));
        let a = adapt_mapping(&map).unwrap();
        let r = &a.manuscript.referees[0];
        assert_eq!(r.dates.due(), None);
        assert!(r.dates.agreed().is_some());
        assert_eq!(a.warnings.len(), 1);
    }

    #[test]
    fn test_nested_inverted_dates_keep_the_valid_ones() {
        let map = obj(json!({
            "manuscript_id": "M1",
            "referees": [{"name": "Doe, Jane",
                          "dates": {"invited": "2024-01-01", "agreed": "2024-03-10", "due": "2024-03-01"}}]
        }));
        let a = adapt_mapping(&map).unwrap();
        let r = &a.manuscript.referees[0];
        assert_eq!(r.dates.invited(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(r.dates.agreed(), NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(r.dates.due(), None);
        assert_eq!(r.status, RefereeStatus::Agreed);
        assert_eq!(a.warnings.len(), 1);
        assert!(a.warnings[0].contains("due date dropped"));
    }

    #[test]
    fn test_nested_report_object() {
        let map = obj(json!({
            "manuscript_id": "M1",
            "referees": [{"name": "Doe, Jane", "Affiliation": "ETH",
                          "report": {"text": "Fine.", "recommendation": "major_revision"}}]
        }));
        let r = adapt_mapping(&map).unwrap().manuscript.referees.remove(0);
        assert_eq!(r.institution.as_deref(), Some("ETH"));
        let report = r.report.unwrap();
        assert_eq!(report.text.as_deref(), Some("Fine."));
        assert_eq!(report.recommendation, Some(Recommendation::MajorRevision));
    }

    #[test]
    fn test_unreadable_date_warns() {
        let map = obj(json!({"Manuscript #": "M1", "Submitted": "sometime"}));
        let a = adapt_mapping(&map).unwrap();
        assert_eq!(a.manuscript.submission_date, None);
        assert!(a.warnings[0].contains("sometime"));
    }

    #[test]
    fn test_report_and_recommendation() {
        let map = obj(json!({
            "Manuscript #": "M1",
            "Referees": [{"Referee": "Doe, Jane", "Completed": "2024-04-01",
                          "Report": "Solid work.", "Recommendation": "Minor Revision"}]
        }));
        let r = adapt_mapping(&map).unwrap().manuscript.referees.remove(0);
        assert_eq!(r.status, RefereeStatus::Completed);
        let report = r.report.unwrap();
        assert_eq!(report.recommendation, Some(Recommendation::MinorRevision));
        assert_eq!(report.text.as_deref(), Some("Solid work."));
    }

    #[test]
    fn test_typed_empty_id_rejected() {
        assert!(adapt_typed(Manuscript::new("  ", "t")).is_err());
        assert!(adapt_typed(Manuscript::new("X-1", "t")).is_ok());
    }
}
