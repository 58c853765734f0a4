//! JSON bodies of the preferences service.
//!
//! Field names follow the service (`stringid`, `subscribedNewsletters`, ...);
//! conversion into domain types happens in the HTTP client.

use serde::{Deserialize, Serialize};
use sp_core::newsletter::NewsletterSelection;

/// Common envelope of every response body.
pub(crate) trait Envelope {
    fn success(&self) -> bool;
    fn message(&self) -> Option<&str>;
}

fn default_true() -> bool {
    true
}

macro_rules! impl_envelope {
    ($($name:ident),* $(,)?) => {
        $(
            impl Envelope for $name {
                fn success(&self) -> bool {
                    self.success
                }

                fn message(&self) -> Option<&str> {
                    self.message.as_deref()
                }
            }
        )*
    };
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewsletterDto {
    pub stringid: String,
    pub display_name: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewsletterListBody {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub newsletters: Vec<NewsletterDto>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionsBody {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub subscribed_newsletters: Vec<String>,
    #[serde(default = "default_true")]
    pub wants_marketing_emails: bool,
    pub learning_level: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscribeBody<'a> {
    pub first_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
    pub email: &'a str,
    pub newsletters: &'a NewsletterSelection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscribeResponseBody {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub subscribed_newsletters: Vec<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PreferencesBody<'a> {
    pub email: &'a str,
    pub newsletters: &'a NewsletterSelection,
    pub marketing_opt_out: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PreferencesResponseBody {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub subscribed_newsletters: Vec<String>,
    #[serde(default)]
    pub marketing_opt_out: bool,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LearningLevelBody<'a> {
    pub email: &'a str,
    pub learning_level: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LearningLevelResponseBody {
    #[serde(default = "default_true")]
    pub success: bool,
    pub learning_level: Option<i64>,
    pub message: Option<String>,
}

/// Body of a non-2xx response, when the server sent one.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

impl_envelope!(
    NewsletterListBody,
    SubscriptionsBody,
    SubscribeResponseBody,
    PreferencesResponseBody,
    LearningLevelResponseBody,
);
