//! Working form state.

use serde::{Deserialize, Serialize};

use crate::newsletter::NewsletterSelection;
use crate::preference::LearningLevel;
use crate::session::SessionContext;

/// Fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    FirstName,
    LastName,
    Email,
    ConfirmEmail,
    Newsletters,
}

impl FieldName {
    pub const ALL: [FieldName; 5] = [
        FieldName::FirstName,
        FieldName::LastName,
        FieldName::Email,
        FieldName::ConfirmEmail,
        FieldName::Newsletters,
    ];
}

/// Free-text inputs editable through `on_field_change`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    FirstName,
    LastName,
    Email,
    ConfirmEmail,
}

impl From<TextField> for FieldName {
    fn from(field: TextField) -> Self {
        match field {
            TextField::FirstName => FieldName::FirstName,
            TextField::LastName => FieldName::LastName,
            TextField::Email => FieldName::Email,
            TextField::ConfirmEmail => FieldName::ConfirmEmail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub confirm_email: String,
    pub selected_newsletters: NewsletterSelection,
    pub learning_level: Option<LearningLevel>,
    pub wants_marketing_emails: bool,
}

impl FormData {
    /// Fresh form for a session. Authenticated sessions start with their email filled in.
    pub fn for_session(session: &SessionContext) -> Self {
        Self {
            email: session.authenticated_email().unwrap_or_default().to_string(),
            ..Self::default()
        }
    }

    pub fn set_text(&mut self, field: TextField, value: String) {
        match field {
            TextField::FirstName => self.first_name = value,
            TextField::LastName => self.last_name = value,
            TextField::Email => self.email = value,
            TextField::ConfirmEmail => self.confirm_email = value,
        }
    }
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            confirm_email: String::new(),
            selected_newsletters: NewsletterSelection::new(),
            learning_level: None,
            wants_marketing_emails: true,
        }
    }
}
