//! Form-level validation rules.
//!
//! # Responsibility
//! - Hold the static bounds used by coach and athlete forms.
//! - Collect failures into a field-keyed map instead of failing fast, so a
//!   caller can render every problem inline at once.
//!
//! # Invariants
//! - An empty `ValidationErrors` means the input is acceptable.
//! - Field keys use the camelCase names of the persisted JSON shape.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-\+\(\)]+$").expect("valid phone regex"));

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;
pub const INSTRUCTIONS_MAX_LEN: usize = 1000;

pub const MIN_SETS: u32 = 1;
pub const MAX_SETS: u32 = 20;
pub const MIN_REPS: u32 = 1;
pub const MAX_REPS: u32 = 200;
pub const MIN_WEIGHT: f64 = 0.0;
/// Pounds.
pub const MAX_WEIGHT: f64 = 1000.0;
/// Seconds.
pub const MIN_DURATION: u32 = 1;
pub const MAX_DURATION: u32 = 3600;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Field-keyed validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Merges another error set under `prefix` (e.g. `exercises[2]`).
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationErrors) {
        for (field, message) in other.fields {
            self.add(format!("{prefix}.{field}"), message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed:")?;
        for (index, (field, message)) in self.fields.iter().enumerate() {
            let sep = if index == 0 { " " } else { "; " };
            write!(f, "{sep}{field}: {message}")?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Checks a display name against the shared 2..=100 character rule.
pub fn check_name(errors: &mut ValidationErrors, field: &str, label: &str, value: &str) {
    let len = value.trim().chars().count();
    if len < NAME_MIN_LEN {
        errors.add(
            field,
            format!("{label} must be at least {NAME_MIN_LEN} characters"),
        );
    } else if len > NAME_MAX_LEN {
        errors.add(
            field,
            format!("{label} must be at most {NAME_MAX_LEN} characters"),
        );
    }
}

pub fn check_max_len(errors: &mut ValidationErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        if value.chars().count() > max {
            errors.add(field, format!("must be at most {max} characters"));
        }
    }
}

pub fn check_range_u32(errors: &mut ValidationErrors, field: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.add(field, format!("must be between {min} and {max}"));
    }
}

pub fn check_range_f64(errors: &mut ValidationErrors, field: &str, value: f64, min: f64, max: f64) {
    if !value.is_finite() || value < min || value > max {
        errors.add(field, format!("must be between {min} and {max}"));
    }
}

#[cfg(test)]
mod tests {
    use super::{check_name, is_valid_email, is_valid_phone, ValidationErrors};

    #[test]
    fn email_pattern_matches_form_rule() {
        assert!(is_valid_email("jane@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane smith@example.com"));
    }

    #[test]
    fn phone_pattern_allows_common_punctuation() {
        assert!(is_valid_phone("+1 (860) 555-0100"));
        assert!(!is_valid_phone("call me"));
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "first");
        errors.add("name", "second");
        assert_eq!(errors.get("name"), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn name_check_trims_before_counting() {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", "Name", "  J ");
        assert!(errors.get("name").unwrap().contains("at least 2"));
    }

    #[test]
    fn display_lists_every_field() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "bad");
        errors.add("name", "short");
        assert_eq!(errors.to_string(), "validation failed: email: bad; name: short");
    }
}
