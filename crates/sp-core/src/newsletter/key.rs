//! Newsletter key wrapper.

use serde::{Deserialize, Serialize};

/// Stable identifier of a newsletter list (the backend's `stringid`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewsletterKey(String);

impl NewsletterKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NewsletterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NewsletterKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NewsletterKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for NewsletterKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for NewsletterKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
