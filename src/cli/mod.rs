//! Command implementations and terminal output.

pub mod audit;
pub mod check;
pub mod dates;
pub mod decompose;
pub mod report;
pub mod setup;
pub mod ui;

use crate::core::derivation::start_of_day;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Parses a calendar date in `format`, falling back to RFC 3339 and ISO
/// timestamps whose time of day is dropped.
pub fn parse_date(value: &str, format: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, format) {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(start_of_day(&timestamp));
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(timestamp.date());
    }
    Err(anyhow!("Invalid date '{value}', expected format {format}"))
}

pub fn parse_optional_date(value: Option<&str>, format: &str) -> Result<Option<NaiveDate>> {
    value.map(|v| parse_date(v, format)).transpose()
}

/// The given date, or the local calendar date when none is given.
pub fn resolve_today(value: Option<&str>, format: &str) -> Result<NaiveDate> {
    Ok(parse_optional_date(value, format)?.unwrap_or_else(|| Local::now().date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(parse_date("2024-06-01", "%Y-%m-%d").unwrap(), expected);
        assert_eq!(parse_date("01/06/2024", "%d/%m/%Y").unwrap(), expected);
        assert_eq!(
            parse_date("2024-06-01T23:15:00+02:00", "%Y-%m-%d").unwrap(),
            expected
        );
        assert_eq!(
            parse_date("2024-06-01T08:00:00", "%Y-%m-%d").unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let err = parse_date("June first", "%Y-%m-%d").unwrap_err();
        assert!(err.to_string().contains("Invalid date"));
        assert!(parse_date("2024-02-30", "%Y-%m-%d").is_err());
    }

    #[test]
    fn test_optional_and_today() {
        assert_eq!(parse_optional_date(None, "%Y-%m-%d").unwrap(), None);
        assert_eq!(
            resolve_today(Some("2024-06-01"), "%Y-%m-%d").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }
}
