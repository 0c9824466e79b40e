//! Raw counters for an extraction run and the success rates derived
//! from them.

use refex_common::ErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataQualityMetrics {
    pub total_manuscripts_found: usize,
    pub total_manuscripts_processed: usize,
    pub total_referees_found: usize,
    pub total_referees_with_emails: usize,
    pub total_pdfs_attempted: usize,
    pub total_pdfs_downloaded: usize,

    pub authentication_errors: usize,
    pub navigation_errors: usize,
    pub parsing_errors: usize,
    pub download_errors: usize,
    pub configuration_errors: usize,

    pub extraction_duration_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_seconds_per_manuscript: Option<f64>,

    // Present only when the denominator is non-zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manuscript_success_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_success_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_success_rate: Option<f64>,
}

impl DataQualityMetrics {
    /// Validation failures on scraped data count as parsing errors.
    pub fn record_error(&mut self, kind: ErrorKind) {
        match kind {
            ErrorKind::Authentication => self.authentication_errors += 1,
            ErrorKind::Navigation     => self.navigation_errors += 1,
            ErrorKind::Parsing | ErrorKind::Validation => self.parsing_errors += 1,
            ErrorKind::Download       => self.download_errors += 1,
            ErrorKind::Configuration  => self.configuration_errors += 1,
        }
    }

    pub fn errors_of(&self, kind: ErrorKind) -> usize {
        match kind {
            ErrorKind::Authentication => self.authentication_errors,
            ErrorKind::Navigation     => self.navigation_errors,
            ErrorKind::Parsing | ErrorKind::Validation => self.parsing_errors,
            ErrorKind::Download       => self.download_errors,
            ErrorKind::Configuration  => self.configuration_errors,
        }
    }

    pub fn total_errors(&self) -> usize {
        self.authentication_errors
            + self.navigation_errors
            + self.parsing_errors
            + self.download_errors
            + self.configuration_errors
    }

    pub fn set_duration(&mut self, seconds: f64) {
        self.extraction_duration_seconds = seconds.max(0.0);
        self.average_seconds_per_manuscript = ratio(
            self.extraction_duration_seconds,
            self.total_manuscripts_processed,
        );
    }

    /// Fill in the derived rates. A rate whose denominator is zero is
    /// left as `None`.
    pub fn calculate_success_rates(&mut self) {
        self.manuscript_success_rate =
            ratio(self.total_manuscripts_processed as f64, self.total_manuscripts_found);
        self.pdf_success_rate =
            ratio(self.total_pdfs_downloaded as f64, self.total_pdfs_attempted);
        self.email_success_rate =
            ratio(self.total_referees_with_emails as f64, self.total_referees_found);
    }
}

fn ratio(numerator: f64, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator / denominator as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominators_omitted() {
        let mut m = DataQualityMetrics::default();
        m.calculate_success_rates();
        assert_eq!(m.manuscript_success_rate, None);
        assert_eq!(m.pdf_success_rate, None);
        assert_eq!(m.email_success_rate, None);

        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("pdf_success_rate").is_none());
    }

    #[test]
    fn test_rates_computed_when_possible() {
        let mut m = DataQualityMetrics {
            total_manuscripts_found: 4,
            total_manuscripts_processed: 3,
            total_referees_found: 0,
            total_pdfs_attempted: 2,
            total_pdfs_downloaded: 1,
            ..Default::default()
        };
        m.calculate_success_rates();
        assert_eq!(m.manuscript_success_rate, Some(0.75));
        assert_eq!(m.pdf_success_rate, Some(0.5));
        assert_eq!(m.email_success_rate, None);
    }

    #[test]
    fn test_error_counters() {
        let mut m = DataQualityMetrics::default();
        m.record_error(ErrorKind::Authentication);
        m.record_error(ErrorKind::Validation);
        m.record_error(ErrorKind::Parsing);
        assert_eq!(m.errors_of(ErrorKind::Parsing), 2);
        assert_eq!(m.total_errors(), 3);
    }

    #[test]
    fn test_average_duration() {
        let mut m = DataQualityMetrics { total_manuscripts_processed: 4, ..Default::default() };
        m.set_duration(10.0);
        assert_eq!(m.average_seconds_per_manuscript, Some(2.5));
        m.total_manuscripts_processed = 0;
        m.set_duration(10.0);
        assert_eq!(m.average_seconds_per_manuscript, None);
    }
}
