//! Normalisation of extractor output into canonical manuscripts.

pub mod dates;
pub mod mapping;
pub mod names;

use refex_common::entities::normalize_code;
use tracing::{debug, warn};

use crate::dedup::{dedup_manuscripts, merge_referees};
use crate::models::{ManuscriptRecord, NormalizationReport};

/// Convert every record to a `Manuscript`, stamped with `journal_code`.
///
/// Records that cannot be converted are reported as item errors and
/// skipped; the rest of the batch is unaffected. Duplicate IDs keep their
/// first occurrence.
pub fn normalize_records(records: Vec<ManuscriptRecord>, journal_code: &str) -> NormalizationReport {
    let code = normalize_code(journal_code);
    let mut report = NormalizationReport::default();
    let mut adapted = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let outcome = match record {
            ManuscriptRecord::Typed(m) => mapping::adapt_typed(m),
            ManuscriptRecord::Mapping(map) => mapping::adapt_mapping(&map),
        };
        match outcome {
            Ok(a) => {
                report.errors.extend(a.skipped.into_iter().map(|e| e.at(index)));
                report.warnings.extend(a.warnings);

                let mut m = a.manuscript;
                if !m.journal_code.is_empty() && normalize_code(m.journal_code.trim()) != code {
                    report.warnings.push(format!(
                        "{}: journal code {} replaced by {code}",
                        m.manuscript_id, m.journal_code
                    ));
                }
                m.journal_code = code.clone();
                merge_referees(&mut m.referees);
                adapted.push(m);
            }
            Err(e) => {
                let e = e.at(index);
                warn!(journal = %code, "skipping record: {e}");
                report.errors.push(e);
            }
        }
    }

    let (manuscripts, dropped) = dedup_manuscripts(adapted);
    report.duplicates_removed = dropped.len();
    for id in dropped {
        report.warnings.push(format!("duplicate manuscript {id} dropped, first occurrence kept"));
    }
    debug!(
        journal = %code,
        kept = manuscripts.len(),
        skipped = report.errors.len(),
        "normalised records"
    );
    report.manuscripts = manuscripts;
    report
}
