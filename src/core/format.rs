//! Display formatting for bill fields

use crate::core::bill::BillStatus;
use crate::core::error::FormatError;
use chrono::{Datelike, NaiveDate};

/// Capitalized three-letter French month abbreviations
const MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// Format a raw `YYYY-MM-DD` date as `"4 Avr. 04"`
pub fn try_format_date(raw: &str) -> Result<String, FormatError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        FormatError::InvalidDate {
            raw: raw.to_string(),
            reason: e.to_string(),
        }
    })?;

    let month = MONTHS[date.month0() as usize];
    let year = date.year().rem_euclid(100);

    Ok(format!("{} {}. {:02}", date.day(), month, year))
}

/// Format a raw date for display, falling back to the input unchanged
pub fn format_date(raw: &str) -> String {
    match try_format_date(raw) {
        Ok(formatted) => formatted,
        Err(e) => {
            tracing::debug!(error = %e, "keeping raw date");
            raw.to_string()
        }
    }
}

/// Display label of a bill status
pub fn format_status(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Pending => "En attente",
        BillStatus::Accepted => "Accepté",
        BillStatus::Refused => "Refused",
    }
}
