//! Parsing of string query parameters

use chrono::NaiveDate;

use super::{bad_request, ApiError};

/// Strict `YYYY-MM-DD`; absent or blank values are `None`.
pub fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| bad_request(format!("{} must be a date in YYYY-MM-DD format", field))),
    }
}

/// Like [`parse_date`] but unparseable values are dropped.
pub fn lenient_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
}

/// Parse an optional enum-like parameter with `parse`, 400 on unknown values.
pub fn parse_choice<T>(
    field: &str,
    value: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse(raw)
            .map(Some)
            .ok_or_else(|| bad_request(format!("Invalid {}: {}", field, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BookingStatus;

    #[test]
    fn dates_are_strict_unless_lenient() {
        assert_eq!(
            parse_date("start_date", Some("2030-01-05")).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 5)
        );
        assert_eq!(parse_date("start_date", Some("")).unwrap(), None);
        assert!(parse_date("start_date", Some("05/01/2030")).is_err());
        assert_eq!(lenient_date(Some("05/01/2030")), None);
    }

    #[test]
    fn unknown_choice_is_rejected() {
        assert_eq!(
            parse_choice("status", Some("Pending"), BookingStatus::parse).unwrap(),
            Some(BookingStatus::Pending)
        );
        assert!(parse_choice("status", Some("lost"), BookingStatus::parse).is_err());
        assert_eq!(parse_choice("status", None, BookingStatus::parse).unwrap(), None);
    }
}
