//! Referee name and contact clean-up.
//!
//! Referees must be named "Last, First". Platforms that print "First Last"
//! are rewritten here; a single-token name cannot be rewritten and is
//! rejected.

use lazy_static::lazy_static;
use refex_common::RefexError;
use regex::Regex;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid email regex");
    static ref HONORIFIC: Regex =
        Regex::new(r"(?i)^(dr|prof|professor|mr|mrs|ms)\.?\s+").expect("valid honorific regex");
}

/// Rewrite a scraped name into "Last, First".
pub fn normalize_referee_name(raw: &str) -> Result<String, RefexError> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut name = collapsed.as_str();
    while let Some(m) = HONORIFIC.find(name) {
        name = &name[m.end()..];
    }
    let name = name.trim_matches(|c: char| c == ',' || c.is_whitespace());

    if name.contains(',') {
        return Ok(name.to_string());
    }

    let tokens: Vec<&str> = name.split(' ').filter(|t| !t.is_empty()).collect();
    match tokens.split_last() {
        Some((last, given)) if !given.is_empty() => Ok(format!("{last}, {}", given.join(" "))),
        _ => Err(RefexError::InvalidRefereeName(raw.trim().to_string())),
    }
}

/// Split "Smith, John <js@uni.edu>" or "John Smith (js@uni.edu)" into the
/// name and the email address.
pub fn split_name_and_email(raw: &str) -> (String, Option<String>) {
    match EMAIL.find(raw) {
        Some(m) => {
            let email = m.as_str().to_string();
            let name = format!("{}{}", &raw[..m.start()], &raw[m.end()..]);
            let name = name
                .replace(['<', '>', '(', ')', '[', ']'], " ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            (name, Some(email))
        }
        None => (raw.trim().to_string(), None),
    }
}

/// The first email address in a string, if any.
pub fn extract_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}
