//! Input validation for document generators.
//!
//! Errors are collected rather than returned on the first failure so the
//! treasury clerk sees every problem with a voucher at once.

use std::fmt;

use rust_decimal::Decimal;

/// Validation error with a user-facing message.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    pub message: String,
    /// Suggestion for how to fix the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must not be empty", label))
            .with_suggestion(format!("Fill in the {}", label.to_lowercase()))
    }

    pub fn negative_amount(field: &str, label: &str, value: Decimal) -> Self {
        Self::new(field, format!("{} must not be negative (got {})", label, value))
            .with_suggestion("Record deductions as a withholding tax rate instead")
    }

    pub fn rate_out_of_range(field: &str, value: Decimal) -> Self {
        Self::new(
            field,
            format!("Tax rate {} is outside the range 0 to 100", value),
        )
        .with_suggestion("Enter the withholding rate as a percentage, e.g. 5 for 5%")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Numbered, multi-line summary of every error.
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation failed: {} error(s) found",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    /// Ok if no errors, Err with the formatted message otherwise.
    pub fn into_result(self) -> Result<(), String> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.to_message())
        }
    }
}

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

pub fn validate_non_negative(value: Decimal, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value < Decimal::ZERO {
        errors.add(ValidationError::negative_amount(field, label, value));
    }
}

/// Validate a percentage in `[0, 100]`
pub fn validate_percent(value: Decimal, field: &str, errors: &mut ValidationErrors) {
    if !(Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&value) {
        errors.add(ValidationError::rate_out_of_range(field, value));
    }
}
