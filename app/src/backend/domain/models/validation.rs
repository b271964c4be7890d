use chrono::NaiveDate;
use shared::AdoptionStatus;

/// Date format used for every stored date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be a YYYY-MM-DD date, got '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("Amount cannot be negative")]
    NegativeAmount,
    #[error("Age in months cannot be negative")]
    NegativeAge,
    #[error("Unknown adoption status '{0}' (expected IN_PROGRESS, ADOPTED or REJECTED)")]
    UnknownStatus(String),
    #[error("An animal type named '{0}' already exists")]
    DuplicateTypeName(String),
    #[error("{entity} #{id} does not exist")]
    UnknownReference { entity: &'static str, id: i64 },
}

/// Trimmed value, or `MissingField` when blank
pub fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trimmed value with blanks collapsed to `None`
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required_id(field: &'static str, value: Option<i64>) -> Result<i64, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// A required date, normalized to `YYYY-MM-DD`
pub fn required_date(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = required(field, value)?;
    Ok(parse_date(field, &value)?.format(DATE_FORMAT).to_string())
}

/// An optional date; blanks become `None`, anything else must parse
pub fn optional_date(field: &'static str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    match optional(value) {
        Some(v) => Ok(Some(parse_date(field, &v)?.format(DATE_FORMAT).to_string())),
        None => Ok(None),
    }
}

pub fn parse_status(value: &str) -> Result<AdoptionStatus, ValidationError> {
    value
        .parse()
        .map_err(|_| ValidationError::UnknownStatus(value.trim().to_string()))
}
