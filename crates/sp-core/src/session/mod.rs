//! Session identity passed into the preference flow.

use serde::{Deserialize, Serialize};

/// Who is filling in the form.
///
/// Derived once when the session starts and immutable for the lifetime of a
/// controller; nothing in the flow can switch identity mid-way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub is_logged_in: bool,
    pub user_email: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self {
            is_logged_in: false,
            user_email: None,
        }
    }

    pub fn authenticated(email: impl Into<String>) -> Self {
        Self {
            is_logged_in: true,
            user_email: Some(email.into()),
        }
    }

    /// Email of the authenticated user, if any.
    pub fn authenticated_email(&self) -> Option<&str> {
        if self.is_logged_in {
            self.user_email.as_deref()
        } else {
            None
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
