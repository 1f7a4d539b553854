//! Display helpers for bill rows and form parsing.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::models::BillStatus;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

const MONTHS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// Formats a `YYYY-MM-DD` date as `"4 Avr. 04"`.
pub fn format_date(value: &str) -> Result<String, FormatError> {
    let date =
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| FormatError::InvalidDate {
            value: value.to_string(),
            source,
        })?;

    let month = MONTHS[date.month0() as usize];
    Ok(format!(
        "{} {}. {:02}",
        date.day(),
        month,
        date.year().rem_euclid(100)
    ))
}

pub fn format_status(status: BillStatus) -> &'static str {
    match status {
        BillStatus::Pending => "En attente",
        BillStatus::Accepted => "Accepté",
        BillStatus::Refused => "Refused",
        BillStatus::Unknown => "",
    }
}

/// Parses the leading integer of `raw`, ignoring leading whitespace and any
/// trailing text. A `0x` prefix reads hexadecimal digits. `None` when no digit
/// follows the optional sign and prefix; out-of-range values saturate.
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (radix, rest) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, rest),
    };

    let digits_len = rest
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(rest.len());
    if digits_len == 0 {
        return None;
    }

    // Only digits remain, so the sole failure is overflow.
    let value = match i64::from_str_radix(&rest[..digits_len], radix) {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    };
    Some(value)
}
