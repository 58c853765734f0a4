//! Preferences service port
//!
//! Contract between the preference flow and whatever backend stores
//! subscriptions. Implementations live in the infrastructure layer (an
//! in-memory fake and an HTTP client); both must behave identically from the
//! caller's point of view, and every call must be safe to retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::PreferenceApiError;
use crate::newsletter::{Newsletter, NewsletterKey, NewsletterSelection};
use crate::preference::validation::NEWSLETTERS_REQUIRED;
use crate::preference::LearningLevel;

/// Server-side subscription state of an authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubscriptions {
    pub subscribed_keys: Vec<NewsletterKey>,
    pub wants_marketing_emails: bool,
    pub learning_level: Option<LearningLevel>,
}

/// Anonymous signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub newsletters: NewsletterSelection,
}

impl SubscribeRequest {
    /// Checks shared by every backend before anything is sent.
    ///
    /// The anonymous flow has no opt-out escape hatch, so an empty selection
    /// is always an error here.
    pub fn check(&self) -> Result<(), PreferenceApiError> {
        if self.newsletters.has_any_selected() {
            Ok(())
        } else {
            Err(PreferenceApiError::validation(NEWSLETTERS_REQUIRED))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub subscribed_keys: Vec<NewsletterKey>,
}

/// Authenticated preference update.
///
/// `newsletters` is the full current selection, not a diff. An empty
/// selection is accepted with either opt-out value: with
/// `marketing_opt_out = true` it is an explicit global opt-out, otherwise the
/// user cleared every list by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub email: String,
    pub newsletters: NewsletterSelection,
    pub marketing_opt_out: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesResponse {
    pub subscribed_keys: Vec<NewsletterKey>,
    pub marketing_opt_out: bool,
}

#[async_trait]
pub trait PreferenceApiPort: Send + Sync {
    /// Newsletters currently offered.
    async fn list_newsletters(&self) -> Result<Vec<Newsletter>, PreferenceApiError>;

    /// Subscription state for an authenticated user.
    async fn fetch_user_subscriptions(
        &self,
        email: &str,
    ) -> Result<UserSubscriptions, PreferenceApiError>;

    /// Anonymous signup.
    async fn subscribe(
        &self,
        request: &SubscribeRequest,
    ) -> Result<SubscribeResponse, PreferenceApiError>;

    /// Authenticated update with the full current selection.
    async fn update_preferences(
        &self,
        request: &UpdatePreferencesRequest,
    ) -> Result<UpdatePreferencesResponse, PreferenceApiError>;

    /// Stores the learning level; returns the stored value.
    async fn update_learning_level(
        &self,
        email: &str,
        level: LearningLevel,
    ) -> Result<LearningLevel, PreferenceApiError>;
}
