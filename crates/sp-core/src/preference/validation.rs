//! Field validation rules.
//!
//! Pure functions: they read the form and never trim or otherwise rewrite
//! stored values. Trimming only happens for the blank check.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FieldName, FormData};

pub const FIRST_NAME_REQUIRED: &str = "Please enter your first name.";
pub const EMAIL_REQUIRED: &str = "Please enter your email address.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const CONFIRM_EMAIL_REQUIRED: &str = "Please confirm your email address.";
pub const CONFIRM_EMAIL_MISMATCH: &str = "Email addresses do not match.";
pub const NEWSLETTERS_REQUIRED: &str = "Please select at least one newsletter.";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is a valid regex")
});

/// Per-field error messages. A missing key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FieldName, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Stores `error` for `field`, or clears the field when `error` is `None`.
    pub fn apply(&mut self, field: FieldName, error: Option<String>) {
        match error {
            Some(message) => {
                self.0.insert(field, message);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationState {
    pub field_errors: FieldErrors,
    pub has_attempted_submit: bool,
}

/// Validates every field; used on submit.
pub fn validate_all(form: &FormData, is_logged_in: bool) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in FieldName::ALL {
        errors.apply(field, validate_field(field, form, is_logged_in));
    }
    errors
}

/// Validates a single field; used on blur once a submit has been attempted.
pub fn validate_field(field: FieldName, form: &FormData, is_logged_in: bool) -> Option<String> {
    match field {
        FieldName::FirstName if !is_logged_in => {
            is_blank(&form.first_name).then(|| FIRST_NAME_REQUIRED.to_string())
        }
        FieldName::Email if !is_logged_in => {
            if is_blank(&form.email) {
                Some(EMAIL_REQUIRED.to_string())
            } else if !is_valid_email(&form.email) {
                Some(EMAIL_INVALID.to_string())
            } else {
                None
            }
        }
        FieldName::ConfirmEmail if !is_logged_in => {
            if is_blank(&form.confirm_email) {
                Some(CONFIRM_EMAIL_REQUIRED.to_string())
            } else if form.confirm_email != form.email {
                Some(CONFIRM_EMAIL_MISMATCH.to_string())
            } else {
                None
            }
        }
        FieldName::Newsletters => {
            // An authenticated user who opted out of marketing may clear every list.
            let explicit_opt_out = is_logged_in && !form.wants_marketing_emails;
            (!explicit_opt_out && !form.selected_newsletters.has_any_selected())
                .then(|| NEWSLETTERS_REQUIRED.to_string())
        }
        _ => None,
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
