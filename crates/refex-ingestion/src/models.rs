//! Data models at the extractor boundary.

use refex_common::{ErrorKind, Manuscript, PdfRecord, Referee};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

const MANUSCRIPT_FIELDS: &[&str] = &[
    "manuscript_id", "title", "authors", "status", "submission_date",
    "decision_date", "referees", "journal_code", "pdf_path",
];
const AUTHOR_FIELDS: &[&str] = &["name", "email", "institution", "is_corresponding"];
const REFEREE_FIELDS: &[&str] = &["name", "email", "institution", "status", "dates", "report"];
const DATE_FIELDS: &[&str] = &["invited", "agreed", "declined", "due", "completed"];
const REPORT_FIELDS: &[&str] = &["pdf_path", "text", "recommendation"];

/// Manuscript-like data as produced by an extractor. Some extractors emit
/// typed manuscripts, others plain mappings keyed by column labels
/// ("Manuscript #", "Title", "Referees", ...).
///
/// A record is `Typed` only when every key, nested ones included, belongs
/// to the typed shape and it passes the entity constructors. Anything else
/// stays a `Mapping` for the adapter, so label-keyed columns are never
/// dropped on the way in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ManuscriptRecord {
    Typed(Manuscript),
    Mapping(Map<String, Value>),
}

impl ManuscriptRecord {
    pub fn from_map(map: Map<String, Value>) -> Self {
        if has_typed_shape(&map) {
            if let Ok(m) = serde_json::from_value::<Manuscript>(Value::Object(map.clone())) {
                return ManuscriptRecord::Typed(m);
            }
        }
        ManuscriptRecord::Mapping(map)
    }
}

impl<'de> Deserialize<'de> for ManuscriptRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(ManuscriptRecord::from_map)
    }
}

fn keys_within(map: &Map<String, Value>, allowed: &[&str]) -> bool {
    map.keys().all(|k| allowed.contains(&k.as_str()))
}

/// `Null` is accepted wherever serde would fill in a default.
fn objects_within(value: Option<&Value>, allowed: &[&str]) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(o)) => keys_within(o, allowed),
        Some(_) => false,
    }
}

fn has_typed_shape(map: &Map<String, Value>) -> bool {
    if !keys_within(map, MANUSCRIPT_FIELDS) {
        return false;
    }
    let authors_ok = match map.get("authors") {
        Some(Value::Array(items)) => items.iter().all(|a| objects_within(Some(a), AUTHOR_FIELDS)),
        _ => true,
    };
    let referees_ok = match map.get("referees") {
        Some(Value::Array(items)) => items.iter().all(|r| match r {
            Value::Object(o) => {
                keys_within(o, REFEREE_FIELDS)
                    && objects_within(o.get("dates"), DATE_FIELDS)
                    && objects_within(o.get("report"), REPORT_FIELDS)
            }
            _ => false,
        }),
        _ => true,
    };
    authors_ok && referees_ok
}

impl From<Manuscript> for ManuscriptRecord {
    fn from(m: Manuscript) -> Self {
        ManuscriptRecord::Typed(m)
    }
}

impl From<Map<String, Value>> for ManuscriptRecord {
    fn from(map: Map<String, Value>) -> Self {
        ManuscriptRecord::Mapping(map)
    }
}

/// A single record that could not be used as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemError {
    /// Position of the record in the extractor output.
    pub index: usize,
    pub manuscript_id: Option<String>,
    pub kind: ErrorKind,
    pub message: String,
}

impl ItemError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { index: 0, manuscript_id: None, kind, message: message.into() }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn for_manuscript(mut self, id: impl Into<String>) -> Self {
        self.manuscript_id = Some(id.into());
        self
    }
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.manuscript_id {
            Some(id) => write!(f, "record {} ({id}): {}", self.index, self.message),
            None => write!(f, "record {}: {}", self.index, self.message),
        }
    }
}

/// Canonical manuscripts plus everything that was skipped or repaired.
#[derive(Debug, Clone, Default)]
pub struct NormalizationReport {
    pub manuscripts: Vec<Manuscript>,
    pub errors: Vec<ItemError>,
    pub warnings: Vec<String>,
    pub duplicates_removed: usize,
}

/// Failure reported by the extractor itself (login refused, page missing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Everything one extractor run hands over.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceOutput {
    #[serde(default)]
    pub manuscripts: Vec<ManuscriptRecord>,
    /// Flattened referee list, for extractors that collect referees
    /// separately from manuscripts.
    #[serde(default)]
    pub referees: Vec<Referee>,
    #[serde(default)]
    pub pdfs: Vec<PdfRecord>,
    #[serde(default)]
    pub errors: Vec<ReportedError>,
    /// Manuscript count advertised by the dashboard, if any.
    #[serde(default)]
    pub expected_manuscripts: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_record_is_detected() {
        let r: ManuscriptRecord = serde_json::from_str(
            r#"{"manuscript_id":"M1","title":"T","referees":[{"name":"Doe, Jane"}]}"#,
        )
        .unwrap();
        assert!(matches!(r, ManuscriptRecord::Typed(m) if m.referees.len() == 1));
    }

    #[test]
    fn test_label_keyed_record_is_mapping() {
        let r: ManuscriptRecord =
            serde_json::from_str(r#"{"Manuscript #":"M1","Title":"T"}"#).unwrap();
        assert!(matches!(r, ManuscriptRecord::Mapping(_)));
    }

    #[test]
    fn test_typed_shape_with_bad_referee_falls_back_to_mapping() {
        let r: ManuscriptRecord = serde_json::from_str(
            r#"{"manuscript_id":"M1","referees":[{"name":"Jane Doe"}]}"#,
        )
        .unwrap();
        assert!(matches!(r, ManuscriptRecord::Mapping(_)));
    }

    #[test]
    fn test_label_keyed_columns_beside_typed_id_stay_mapping() {
        let r: ManuscriptRecord = serde_json::from_str(
            r#"{"manuscript_id":"MAFI-2024-0001","Title":"Paper",
                "Referees":["Doe, Jane <jd@uni.edu>"],"Submitted":"12-Mar-2024"}"#,
        )
        .unwrap();
        assert!(matches!(r, ManuscriptRecord::Mapping(ref m) if m.contains_key("Referees")));
    }

    #[test]
    fn test_extra_referee_key_stays_mapping() {
        let r: ManuscriptRecord = serde_json::from_str(
            r#"{"manuscript_id":"M1","referees":[{"name":"Doe, Jane","Affiliation":"ETH"}]}"#,
        )
        .unwrap();
        assert!(matches!(r, ManuscriptRecord::Mapping(_)));
    }

    #[test]
    fn test_typed_record_with_nested_dates_and_report() {
        let r: ManuscriptRecord = serde_json::from_str(
            r#"{"manuscript_id":"M1","authors":[{"name":"Smith, J."}],"referees":[{"name":"Doe, Jane",
                "dates":{"invited":"2024-01-01","agreed":"2024-01-03"},
                "report":{"text":"Fine.","recommendation":"accept"}}]}"#,
        )
        .unwrap();
        assert!(matches!(r, ManuscriptRecord::Typed(m) if m.referees[0].report.is_some()));
    }

    #[test]
    fn test_non_object_record_is_rejected() {
        assert!(serde_json::from_str::<ManuscriptRecord>(r#""M1""#).is_err());
    }

    #[test]
    fn test_item_error_display() {
        let e = ItemError::new(ErrorKind::Parsing, "missing ID").at(3).for_manuscript("X");
        assert_eq!(e.to_string(), "record 3 (X): missing ID");
    }
}
