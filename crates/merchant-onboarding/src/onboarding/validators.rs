use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Per-field validation failure. Rendered inline by the UI; never raised past the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldError {
    Required,
    PatternMismatch,
    MinLength { min: usize, actual: usize },
    MaxLength { max: usize, actual: usize },
    InvalidEmail,
    OutOfRange { min: i64, max: i64 },
}

impl FieldError {
    pub const fn kind(&self) -> &'static str {
        match self {
            FieldError::Required => "required",
            FieldError::PatternMismatch => "pattern-mismatch",
            FieldError::MinLength { .. } => "min-length",
            FieldError::MaxLength { .. } => "max-length",
            FieldError::InvalidEmail => "invalid-email",
            FieldError::OutOfRange { .. } => "out-of-range",
        }
    }

    pub fn message(&self, label: &str) -> String {
        match self {
            FieldError::Required => format!("{label} is required"),
            FieldError::PatternMismatch => "Please enter a valid format".to_string(),
            FieldError::MinLength { min, .. } => {
                format!("{label} must be at least {min} characters")
            }
            FieldError::MaxLength { max, .. } => {
                format!("{label} must be at most {max} characters")
            }
            FieldError::InvalidEmail => "Please enter a valid email address".to_string(),
            FieldError::OutOfRange { min, max } => {
                format!("{label} must be between {min} and {max}")
            }
        }
    }
}

/// Named patterns used by the onboarding form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Philippine mobile number: `09XXXXXXXXX` or `+639XXXXXXXXX`, spaces and dashes ignored.
    MobileNumber,
}

impl Pattern {
    pub fn matches(self, value: &str) -> bool {
        match self {
            Pattern::MobileNumber => {
                let compact: String = value
                    .trim()
                    .chars()
                    .filter(|ch| *ch != ' ' && *ch != '-')
                    .collect();
                mobile_number_regex().is_match(&compact)
            }
        }
    }
}

static MOBILE_NUMBER: OnceLock<Regex> = OnceLock::new();
static EMAIL: OnceLock<Regex> = OnceLock::new();

fn mobile_number_regex() -> &'static Regex {
    MOBILE_NUMBER.get_or_init(|| {
        Regex::new(r"^(?:09|\+639)[0-9]{9}$").expect("mobile number pattern compiles")
    })
}

fn email_regex() -> &'static Regex {
    EMAIL.get_or_init(|| {
        let atom = r"[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+";
        let label = r"[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?";
        Regex::new(&format!(r"^{atom}(?:\.{atom})*@{label}(?:\.{label})*$"))
            .expect("email pattern compiles")
    })
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, _)) if local.len() <= 64 => email_regex().is_match(value),
        _ => false,
    }
}

/// A single rule attached to a field.
///
/// Only [`FieldValidator::Required`] rejects an empty value; every other rule treats
/// an empty value as "nothing to check", so optional fields stay valid when blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidator {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Pattern),
    Email,
    Range { min: i64, max: i64 },
}

impl FieldValidator {
    pub fn check(&self, value: &str) -> Result<(), FieldError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return match self {
                FieldValidator::Required => Err(FieldError::Required),
                _ => Ok(()),
            };
        }

        match self {
            FieldValidator::Required => Ok(()),
            FieldValidator::MinLength(min) => {
                let actual = trimmed.chars().count();
                if actual < *min {
                    Err(FieldError::MinLength { min: *min, actual })
                } else {
                    Ok(())
                }
            }
            FieldValidator::MaxLength(max) => {
                let actual = trimmed.chars().count();
                if actual > *max {
                    Err(FieldError::MaxLength { max: *max, actual })
                } else {
                    Ok(())
                }
            }
            FieldValidator::Pattern(pattern) => {
                if pattern.matches(trimmed) {
                    Ok(())
                } else {
                    Err(FieldError::PatternMismatch)
                }
            }
            FieldValidator::Email => {
                if is_email(trimmed) {
                    Ok(())
                } else {
                    Err(FieldError::InvalidEmail)
                }
            }
            FieldValidator::Range { min, max } => match trimmed.parse::<i64>() {
                Ok(number) if (*min..=*max).contains(&number) => Ok(()),
                _ => Err(FieldError::OutOfRange {
                    min: *min,
                    max: *max,
                }),
            },
        }
    }
}

/// Runs rules in order and reports the first failure.
pub fn validate(validators: &[FieldValidator], value: &str) -> Result<(), FieldError> {
    validators
        .iter()
        .try_for_each(|validator| validator.check(value))
}
