//! Field validation for incoming mortgage applications.
//!
//! `validate` checks the typed fields (birth date, gender) first, then the
//! required fields in declaration order, and stops at the first failure.

use chrono::NaiveDate;
use serde_json::Value;
use std::fmt;

use crate::models::{ApplicationSubmission, Gender, NewApplication};

pub const DATE_FORMAT_HINT: &str = "date format yyyy-mm-dd, example 1999-01-21";
pub const GENDER_HINT: &str = "gender should be MALE or FEMALE";

pub const MAX_AMOUNT: f64 = 1_000_000_000.0;
pub const MAX_DURATION_IN_MONTHS: i32 = 1200;

/// A single offending field and the message reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Extracts the text of a typed field. JSON null counts as absent; any other
/// non-string value fails with the field's fixed hint.
pub fn typed_text<'a>(
    field: &'static str,
    value: Option<&'a Value>,
    hint: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ValidationError::new(field, hint)),
    }
}

/// Parses an ISO calendar date (`yyyy-mm-dd`). An empty string counts as absent.
pub fn parse_birth_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) if s.len() == 10 => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::new("birthDate", DATE_FORMAT_HINT)),
        Some(_) => Err(ValidationError::new("birthDate", DATE_FORMAT_HINT)),
    }
}

/// Parses the gender enumeration. Matching is exact and case-sensitive.
pub fn parse_gender(raw: Option<&str>) -> Result<Option<Gender>, ValidationError> {
    raw.map(|s| {
        s.parse::<Gender>()
            .map_err(|_| ValidationError::new("gender", GENDER_HINT))
    })
    .transpose()
}

fn require_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::new(
            field,
            format!("{} cannot be empty", field),
        )),
    }
}

fn require_amount(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    let v = value.ok_or_else(|| ValidationError::new(field, format!("{} cannot be null", field)))?;
    if !v.is_finite() {
        return Err(ValidationError::new(
            field,
            format!("{} must be a number", field),
        ));
    }
    if v < 0.0 {
        return Err(ValidationError::new(
            field,
            format!("{} min value = 0", field),
        ));
    }
    if v > MAX_AMOUNT {
        return Err(ValidationError::new(
            field,
            format!("{} max value = 1000000000", field),
        ));
    }
    Ok(v)
}

fn require_duration(field: &'static str, value: Option<i32>) -> Result<i32, ValidationError> {
    let v = value.ok_or_else(|| ValidationError::new(field, format!("{} cannot be null", field)))?;
    if v < 0 {
        return Err(ValidationError::new(
            field,
            format!("{} min value = 0", field),
        ));
    }
    if v > MAX_DURATION_IN_MONTHS {
        return Err(ValidationError::new(
            field,
            format!("{} max value = {}", field, MAX_DURATION_IN_MONTHS),
        ));
    }
    Ok(v)
}

/// Validates a raw submission, returning the first failing field.
pub fn validate(submission: ApplicationSubmission) -> Result<NewApplication, ValidationError> {
    let birth_date = parse_birth_date(typed_text(
        "birthDate",
        submission.birth_date.as_ref(),
        DATE_FORMAT_HINT,
    )?)?;
    let gender = parse_gender(typed_text(
        "gender",
        submission.gender.as_ref(),
        GENDER_HINT,
    )?)?;

    Ok(NewApplication {
        first_name: require_text("firstName", submission.first_name)?,
        second_name: require_text("secondName", submission.second_name)?,
        last_name: require_text("lastName", submission.last_name)?,
        passport: require_text("passport", submission.passport)?,
        birth_date,
        gender,
        salary: require_amount("salary", submission.salary)?,
        credit_amount: require_amount("creditAmount", submission.credit_amount)?,
        duration_in_months: require_duration("durationInMonths", submission.duration_in_months)?,
    })
}
