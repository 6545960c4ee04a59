//! Save-time validation errors and shared checks.

use crate::text::dates::parse_iso_date;
use crate::text::masks::digits_only;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure raised before any store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text is blank after trim.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
    /// Document number has the wrong digit count.
    InvalidDigits {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Document number is neither a CPF (11 digits) nor a CNPJ (14 digits).
    InvalidDocument { field: &'static str, actual: usize },
    /// Calendar date is not a valid `YYYY-MM-DD` value.
    InvalidDate { field: &'static str, value: String },
    /// `later` must not precede `earlier`.
    DateOrder {
        earlier: &'static str,
        later: &'static str,
    },
    /// Quantity must be zero or positive.
    NegativeQuantity { field: &'static str, value: i64 },
    /// Record refers to itself through a hierarchy link.
    SelfReference { field: &'static str },
    /// Gift type `Outro` needs a description.
    MissingGiftDescription,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => write!(f, "{entity}.{field} must not be blank"),
            Self::InvalidDigits {
                field,
                expected,
                actual,
            } => write!(f, "{field} must have {expected} digits, got {actual}"),
            Self::InvalidDocument { field, actual } => {
                write!(f, "{field} must have 11 (CPF) or 14 (CNPJ) digits, got {actual}")
            }
            Self::InvalidDate { field, value } => {
                write!(f, "{field} is not a valid YYYY-MM-DD date: `{value}`")
            }
            Self::DateOrder { earlier, later } => {
                write!(f, "{later} must not be earlier than {earlier}")
            }
            Self::NegativeQuantity { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::SelfReference { field } => write!(f, "{field} must not reference itself"),
            Self::MissingGiftDescription => {
                write!(f, "gift type `Outro` requires a gift description")
            }
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { entity, field });
    }
    Ok(())
}

pub(crate) fn check_digits(
    field: &'static str,
    value: Option<&str>,
    expected: usize,
) -> ValidationResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let actual = digits_only(value).len();
    if actual != expected {
        return Err(ValidationError::InvalidDigits {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Accepts either a CPF or a CNPJ.
pub(crate) fn check_document(field: &'static str, value: Option<&str>) -> ValidationResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    match digits_only(value).len() {
        11 | 14 => Ok(()),
        actual => Err(ValidationError::InvalidDocument { field, actual }),
    }
}

pub(crate) fn check_date(
    field: &'static str,
    value: Option<&str>,
) -> ValidationResult<Option<NaiveDate>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match parse_iso_date(value).filter(|_| value.trim().len() == 10) {
        Some(date) => Ok(Some(date)),
        None => Err(ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        }),
    }
}
