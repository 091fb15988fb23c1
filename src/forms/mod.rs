//! Form definitions backing the dashboard routes.
//!
//! Forms are deserialised as submitted, validated with `validator` and then
//! converted into typed domain payloads. Nothing in this module touches the
//! repository.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod clients;
pub mod emails;
pub mod invoices;
pub mod partners;
pub mod quotations;
pub mod settings;
pub mod templates;
pub mod users;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid {0}")]
    InvalidId(&'static str),

    #[error("invalid date")]
    InvalidDate,

    #[error("due date must be after today")]
    DueDateNotInFuture,

    #[error("at least one contact is required")]
    NoContacts,

    #[error("duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("unsupported file type")]
    UnsupportedFile,

    #[error("a file is required")]
    MissingFile,

    #[error("choose either a quotation or an invoice")]
    AmbiguousDocument,

    #[error("invalid CSV: {0}")]
    Csv(String),

    #[error("{0}")]
    Constraint(#[from] TypeConstraintError),
}

/// Parses an optional identifier submitted from a `<select>`; blank means none.
pub(crate) fn parse_optional_id(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<i32>, FormError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<i32>()
            .map(Some)
            .map_err(|_| FormError::InvalidId(field)),
        None => Ok(None),
    }
}

/// Parses an optional `YYYY-MM-DD` date input; blank means none.
pub(crate) fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, FormError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FormError::InvalidDate),
        None => Ok(None),
    }
}

/// Start of `date`, the stored representation of due dates.
pub(crate) fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// `true` when an HTML checkbox was ticked.
pub(crate) fn checkbox(value: Option<&str>) -> bool {
    matches!(value, Some("on" | "true" | "1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_and_dates_are_none() {
        assert_eq!(parse_optional_id(Some("  "), "partner").unwrap(), None);
        assert_eq!(parse_optional_id(Some("7"), "partner").unwrap(), Some(7));
        assert!(parse_optional_id(Some("x"), "partner").is_err());
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("2025-02-28")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28)
        );
        assert!(matches!(
            parse_optional_date(Some("28/02/2025")),
            Err(FormError::InvalidDate)
        ));
    }

    #[test]
    fn checkbox_values() {
        assert!(checkbox(Some("on")));
        assert!(!checkbox(None));
        assert!(!checkbox(Some("off")));
    }
}
