pub mod accounts;
pub mod config;
pub mod init;
pub mod roster;
pub mod runbook;
pub mod tasks;
pub mod templates;

use crate::error::AppError;
use chrono::{NaiveDate, Utc};

/// Parse an optional `YYYY-MM-DD` query value, defaulting to today (UTC).
pub(crate) fn parse_date(value: Option<&str>) -> Result<NaiveDate, AppError> {
    match value {
        None => Ok(Utc::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request(format!("invalid date '{s}': expected YYYY-MM-DD"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso() {
        let d = parse_date(Some("2025-06-10")).unwrap();
        assert_eq!(d.to_string(), "2025-06-10");
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date(Some("10/06/2025")).is_err());
        assert!(parse_date(Some("")).is_err());
    }

    #[test]
    fn parse_date_defaults_to_today() {
        assert_eq!(parse_date(None).unwrap(), Utc::now().date_naive());
    }
}
