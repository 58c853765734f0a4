//! Newsletter domain models

mod catalog;
mod key;
mod selection;

pub use catalog::{default_catalog, selected_labels};
pub use key::NewsletterKey;
pub use selection::NewsletterSelection;

use serde::{Deserialize, Serialize};

/// A newsletter list offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Newsletter {
    pub key: NewsletterKey,
    pub label: String,
    pub icon: String,
}

impl Newsletter {
    pub fn new(key: impl Into<NewsletterKey>, label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            icon: icon.into(),
        }
    }
}
