//! Accreditation validation utilities

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Errors that can occur while validating accreditation fields
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccreditationValidationError {
    #[error("Select a valid choice. {0} is not one of the available choices.")]
    UnknownType(String),

    #[error("Enter a valid date.")]
    InvalidDate(String),

    #[error("Please enter valid accreditation date")]
    DateInFuture(NaiveDate),

    #[error("This field is required.")]
    Required,
}

/// Error attached to one field of one submitted row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Reject accreditation dates after `today`
pub fn validate_accreditation_date(
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), AccreditationValidationError> {
    if date > today {
        return Err(AccreditationValidationError::DateInFuture(date));
    }

    Ok(())
}

/// Parse a form date (`YYYY-MM-DD`)
pub fn parse_accreditation_date(raw: &str) -> Result<NaiveDate, AccreditationValidationError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(AccreditationValidationError::Required);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AccreditationValidationError::InvalidDate(raw.to_string()))
}

/// Flatten derive-based field errors into row-scoped errors
pub fn field_errors_for_row(row: usize, errors: &ValidationErrors) -> Vec<FieldError> {
    let mut result: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let field = field.to_string();
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                FieldError::new(row, field.clone(), message)
            })
        })
        .collect();

    result.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_today_is_allowed() {
        assert!(validate_accreditation_date(date(2024, 5, 1), date(2024, 5, 1)).is_ok());
    }

    #[test]
    fn test_date_in_future_is_rejected() {
        assert_eq!(
            validate_accreditation_date(date(2024, 5, 2), date(2024, 5, 1)),
            Err(AccreditationValidationError::DateInFuture(date(2024, 5, 2)))
        );
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_accreditation_date("2019-09-18"), Ok(date(2019, 9, 18)));
        assert_eq!(
            parse_accreditation_date("  "),
            Err(AccreditationValidationError::Required)
        );
        assert!(matches!(
            parse_accreditation_date("18/09/2019"),
            Err(AccreditationValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AccreditationValidationError::DateInFuture(date(2030, 1, 1)).to_string(),
            "Please enter valid accreditation date"
        );
        assert_eq!(
            AccreditationValidationError::UnknownType("Gold".to_string()).to_string(),
            "Select a valid choice. Gold is not one of the available choices."
        );
    }
}
