use std::sync::Arc;

use tracing::info;

use sp_core::newsletter::NewsletterKey;
use sp_core::ports::{
    PreferenceApiError, PreferenceApiPort, SubscribeRequest, UpdatePreferencesRequest,
};
use sp_core::preference::{compute_change_set, LearningLevel, SubscriptionBaseline};
use sp_core::{FormData, SessionContext};

use super::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub subscribed_keys: Vec<NewsletterKey>,
}

/// Sends the selection stage to the preferences service.
///
/// Anonymous sessions sign up; authenticated sessions send their full current
/// selection together with `marketing_opt_out = !wants_marketing_emails`.
/// The opt-out flag is never derived from an empty selection.
pub struct SubmitSelection {
    api: Arc<dyn PreferenceApiPort>,
    retry: RetryPolicy,
}

impl SubmitSelection {
    pub fn new(api: Arc<dyn PreferenceApiPort>, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    pub async fn execute(
        &self,
        session: &SessionContext,
        form: &FormData,
        baseline: Option<&SubscriptionBaseline>,
    ) -> Result<SubmitOutcome, PreferenceApiError> {
        match session.authenticated_email() {
            None => self.subscribe(form).await,
            Some(email) => self.update(email, form, baseline).await,
        }
    }

    async fn subscribe(&self, form: &FormData) -> Result<SubmitOutcome, PreferenceApiError> {
        let last_name = form.last_name.trim();
        let request = SubscribeRequest {
            first_name: form.first_name.clone(),
            last_name: (!last_name.is_empty()).then(|| form.last_name.clone()),
            email: form.email.clone(),
            newsletters: form.selected_newsletters.clone(),
        };

        let response = self
            .retry
            .run("subscribe", || self.api.subscribe(&request))
            .await?;
        info!(
            subscribed = response.subscribed_keys.len(),
            "anonymous signup accepted"
        );
        Ok(SubmitOutcome {
            subscribed_keys: response.subscribed_keys,
        })
    }

    async fn update(
        &self,
        email: &str,
        form: &FormData,
        baseline: Option<&SubscriptionBaseline>,
    ) -> Result<SubmitOutcome, PreferenceApiError> {
        if let Some(baseline) = baseline {
            let changes = compute_change_set(baseline, form);
            info!(
                added = ?changes.diff.added,
                removed = ?changes.diff.removed,
                opt_out_changed = changes.opt_out_changed,
                "submitting preference changes"
            );
        }

        let request = UpdatePreferencesRequest {
            email: email.to_string(),
            newsletters: form.selected_newsletters.clone(),
            marketing_opt_out: !form.wants_marketing_emails,
        };
        let response = self
            .retry
            .run("update_preferences", || self.api.update_preferences(&request))
            .await?;
        Ok(SubmitOutcome {
            subscribed_keys: response.subscribed_keys,
        })
    }
}

/// Stores the learning level picked on the confirmation stage.
pub struct SaveLearningLevel {
    api: Arc<dyn PreferenceApiPort>,
    retry: RetryPolicy,
}

impl SaveLearningLevel {
    pub fn new(api: Arc<dyn PreferenceApiPort>, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    pub async fn execute(
        &self,
        email: &str,
        level: LearningLevel,
    ) -> Result<LearningLevel, PreferenceApiError> {
        let stored = self
            .retry
            .run("update_learning_level", || {
                self.api.update_learning_level(email, level)
            })
            .await?;
        info!(level = %stored, "learning level stored");
        Ok(stored)
    }
}
