//! Lenient date parsing for the formats editorial platforms print.

use chrono::NaiveDate;

/// Formats seen on ScholarOne, Editorial Manager, SIAM and MSP pages.
const FORMATS: &[&str] = &[
    "%Y-%m-%d",   // 2024-03-12
    "%d-%b-%Y",   // 12-Mar-2024
    "%b %d, %Y",  // Mar 12, 2024
    "%B %d, %Y",  // March 12, 2024
    "%d %b %Y",   // 12 Mar 2024
    "%d %B %Y",   // 12 March 2024
    "%m/%d/%Y",   // 03/12/2024
    "%Y/%m/%d",   // 2024/03/12
];

/// Parse a scraped date. A trailing time ("12-Mar-2024 10:15") or ISO time
/// part ("2024-03-12T10:15:00Z") is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let date_part = s.split('T').next().unwrap_or(s);
    try_formats(s)
        .or_else(|| try_formats(date_part))
        .or_else(|| s.split_whitespace().next().and_then(try_formats))
        .or_else(|| strip_time(s).and_then(try_formats))
}

fn try_formats(s: &str) -> Option<NaiveDate> {
    FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// "Mar 12, 2024 10:15 AM" → "Mar 12, 2024"
fn strip_time(s: &str) -> Option<&str> {
    let comma = s.find(',')?;
    let rest = &s[comma + 1..];
    let year_end = rest.trim_start().find(' ')? + (rest.len() - rest.trim_start().len());
    Some(&s[..comma + 1 + year_end])
}
