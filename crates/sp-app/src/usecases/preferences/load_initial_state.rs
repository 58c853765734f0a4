use std::sync::Arc;

use tracing::{info, warn};

use sp_core::newsletter::{default_catalog, Newsletter};
use sp_core::ports::{PreferenceApiPort, UserSubscriptions};

use super::RetryPolicy;

/// Loads what the form needs on mount.
///
/// Both reads degrade instead of failing: a missing catalog falls back to the
/// built-in one, a failed subscription fetch yields `None`.
pub struct LoadInitialState {
    api: Arc<dyn PreferenceApiPort>,
    retry: RetryPolicy,
}

impl LoadInitialState {
    pub fn new(api: Arc<dyn PreferenceApiPort>, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    pub async fn newsletters(&self) -> Vec<Newsletter> {
        match self
            .retry
            .run("list_newsletters", || self.api.list_newsletters())
            .await
        {
            Ok(newsletters) if !newsletters.is_empty() => newsletters,
            Ok(_) => {
                warn!("preferences service returned no newsletters, using built-in catalog");
                default_catalog()
            }
            Err(err) => {
                warn!(error = %err, "failed to list newsletters, using built-in catalog");
                default_catalog()
            }
        }
    }

    pub async fn subscriptions(&self, email: &str) -> Option<UserSubscriptions> {
        match self
            .retry
            .run("fetch_user_subscriptions", || {
                self.api.fetch_user_subscriptions(email)
            })
            .await
        {
            Ok(subscriptions) => {
                info!(
                    subscribed = subscriptions.subscribed_keys.len(),
                    wants_marketing_emails = subscriptions.wants_marketing_emails,
                    "fetched user subscriptions"
                );
                Some(subscriptions)
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch user subscriptions");
                None
            }
        }
    }
}
