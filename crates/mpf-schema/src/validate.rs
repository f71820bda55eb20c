//! Advisory field checks
//!
//! Checks never gate anything: they produce [`FieldIssue`]s that the form
//! surfaces as hints next to the offending input.

use crate::field::{FieldDescriptor, FieldType};
use chrono::NaiveDate;
use serde_json::Value;

/// A value that does not fit its field descriptor
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldIssue {
    /// Required field left empty
    #[error("{field} is required")]
    Required {
        /// Field name
        field: String,
    },

    /// Text longer than `maxLength`
    #[error("{field} exceeds {max} characters ({actual})")]
    TooLong {
        /// Field name
        field: String,
        /// Allowed length
        max: u32,
        /// Entered length
        actual: usize,
    },

    /// Number field holding non-numeric text
    #[error("{field} must be a number")]
    NotANumber {
        /// Field name
        field: String,
    },

    /// Number outside `{min, max}`
    #[error("{field} is out of range")]
    OutOfRange {
        /// Field name
        field: String,
        /// Lower bound
        min: Option<f64>,
        /// Upper bound
        max: Option<f64>,
    },

    /// Value not among the allowed options
    #[error("{field} must be one of: {}", .options.join(", "))]
    NotAnOption {
        /// Field name
        field: String,
        /// Allowed values
        options: Vec<String>,
    },

    /// Date field holding something that is not a date
    #[error("{field} must be a date (YYYY-MM-DD or DD/MM/YYYY)")]
    NotADate {
        /// Field name
        field: String,
    },

    /// Boolean field holding something other than a flag
    #[error("{field} must be a yes/no value")]
    NotABoolean {
        /// Field name
        field: String,
    },
}

impl FieldIssue {
    /// Name of the offending field
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field }
            | Self::TooLong { field, .. }
            | Self::NotANumber { field }
            | Self::OutOfRange { field, .. }
            | Self::NotAnOption { field, .. }
            | Self::NotADate { field }
            | Self::NotABoolean { field } => field,
        }
    }
}

/// Text form of a scalar value as an input would show it
///
/// `null` is empty; arrays and objects fall back to their JSON text.
#[must_use]
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Whether a value counts as "not filled in"
#[inline]
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "y" | "yes" | "1" | "on" => Some(true),
        "false" | "n" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .ok()
}

/// Check one value against its descriptor
///
/// Blank values only fail the `required` check. The first issue found wins.
///
/// # Errors
/// The [`FieldIssue`] describing the mismatch
pub fn check_value(field: &FieldDescriptor, value: &Value) -> Result<(), FieldIssue> {
    let name = || field.name.clone();

    if is_blank(value) {
        return if field.required {
            Err(FieldIssue::Required { field: name() })
        } else {
            Ok(())
        };
    }

    let text = scalar_text(value);

    if let Some(max) = field.max_length {
        let actual = text.chars().count();
        if actual > max as usize {
            return Err(FieldIssue::TooLong {
                field: name(),
                max,
                actual,
            });
        }
    }

    match field.field_type {
        FieldType::Number if !value.is_number() && text.trim().parse::<f64>().is_err() => {
            return Err(FieldIssue::NotANumber { field: name() });
        }
        FieldType::Date if parse_date(&text).is_none() => {
            return Err(FieldIssue::NotADate { field: name() });
        }
        FieldType::Boolean if !value.is_boolean() && parse_flag(&text).is_none() => {
            return Err(FieldIssue::NotABoolean { field: name() });
        }
        _ => {}
    }

    if let Some(constraint) = &field.constraint {
        let options = constraint.allowed();
        if !options.is_empty() && !options.iter().any(|o| o == &text) {
            return Err(FieldIssue::NotAnOption {
                field: name(),
                options: options.to_vec(),
            });
        }

        if constraint.is_range() {
            if let Ok(number) = text.trim().parse::<f64>() {
                let below = constraint.min.is_some_and(|min| number < min);
                let above = constraint.max.is_some_and(|max| number > max);
                if below || above {
                    return Err(FieldIssue::OutOfRange {
                        field: name(),
                        min: constraint.min,
                        max: constraint.max,
                    });
                }
            }
        }
    }

    Ok(())
}
