//! Deduplication of extracted manuscripts and referees.
//!
//! Manuscripts are keyed by their trimmed ID and the first occurrence wins.
//! Referees within one manuscript are keyed by case-folded name; later
//! duplicates only contribute fields the first one is missing.

use std::collections::HashSet;

use refex_common::{Manuscript, Referee};

/// Result of a deduplication check.
#[derive(Debug, PartialEq)]
pub enum DedupResult {
    /// First time this ID is seen.
    New,
    /// The ID was already accepted earlier in the run.
    DuplicateId(String),
}

/// Tracks the manuscript IDs accepted so far in one run.
#[derive(Debug, Default)]
pub struct ManuscriptDeduper {
    seen: HashSet<String>,
}

impl ManuscriptDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and remember. Blank IDs are never reported as duplicates;
    /// they are the contract's concern.
    pub fn check(&mut self, manuscript: &Manuscript) -> DedupResult {
        let id = manuscript.manuscript_id.trim();
        if id.is_empty() || self.seen.insert(id.to_string()) {
            DedupResult::New
        } else {
            DedupResult::DuplicateId(id.to_string())
        }
    }
}

/// Keep the first manuscript for every ID. Returns the survivors in input
/// order and the IDs of the dropped copies.
pub fn dedup_manuscripts(manuscripts: Vec<Manuscript>) -> (Vec<Manuscript>, Vec<String>) {
    let mut deduper = ManuscriptDeduper::new();
    let mut kept = Vec::with_capacity(manuscripts.len());
    let mut dropped = Vec::new();
    for m in manuscripts {
        match deduper.check(&m) {
            DedupResult::New => kept.push(m),
            DedupResult::DuplicateId(id) => dropped.push(id),
        }
    }
    (kept, dropped)
}

/// Merge referees that appear twice under the same name (for example once
/// from the referee table and once from the history tab).
pub fn merge_referees(referees: &mut Vec<Referee>) {
    let mut merged: Vec<Referee> = Vec::with_capacity(referees.len());
    for r in referees.drain(..) {
        let key = r.name().to_lowercase();
        match merged.iter_mut().find(|m| m.name().to_lowercase() == key) {
            Some(existing) => {
                if !existing.has_email() && r.has_email() {
                    existing.email = r.email;
                }
                if existing.institution.is_none() {
                    existing.institution = r.institution;
                }
                if existing.report.is_none() {
                    existing.report = r.report;
                }
            }
            None => merged.push(r),
        }
    }
    *referees = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use refex_test_utils::{referee, referee_with_email};

    #[test]
    fn test_first_write_wins() {
        let (kept, dropped) = dedup_manuscripts(vec![
            Manuscript::new("M1", "first"),
            Manuscript::new("M2", "other"),
            Manuscript::new(" M1 ", "second"),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].title, "first");
        assert_eq!(dropped, vec!["M1".to_string()]);
    }

    #[test]
    fn test_blank_ids_not_collapsed() {
        let mut d = ManuscriptDeduper::new();
        assert_eq!(d.check(&Manuscript::new("", "a")), DedupResult::New);
        assert_eq!(d.check(&Manuscript::new("", "b")), DedupResult::New);
    }

    #[test]
    fn test_merge_referees_fills_missing_email() {
        let mut refs = vec![
            referee("Doe, Jane"),
            referee("Roe, Richard"),
            referee_with_email("DOE, JANE", "jane@uni.edu"),
        ];
        merge_referees(&mut refs);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name(), "Doe, Jane");
        assert_eq!(refs[0].email.as_deref(), Some("jane@uni.edu"));
    }
}
