//! Server-side starting point for authenticated sessions.

use serde::{Deserialize, Serialize};

use crate::newsletter::NewsletterSelection;
use crate::ports::UserSubscriptions;

/// Subscription state captured once at session start and used only for diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionBaseline {
    pub initial_subscriptions: NewsletterSelection,
    pub initial_wants_marketing: bool,
}

impl SubscriptionBaseline {
    /// Baseline for a session with no prior relationship to the server.
    pub fn empty() -> Self {
        Self {
            initial_subscriptions: NewsletterSelection::new(),
            initial_wants_marketing: true,
        }
    }

    /// Builds the display baseline from fetched server state.
    ///
    /// A server that reports `wants_marketing_emails = false` while the user
    /// still has subscriptions is stale (re-subscribed through another
    /// channel); the baseline shows `true` instead. Nothing is written back.
    pub fn from_server(subscriptions: &UserSubscriptions) -> Self {
        let has_subscriptions = !subscriptions.subscribed_keys.is_empty();
        Self {
            initial_subscriptions: NewsletterSelection::from_keys(
                subscriptions.subscribed_keys.iter().cloned(),
            ),
            initial_wants_marketing: subscriptions.wants_marketing_emails || has_subscriptions,
        }
    }

    /// Whether `from_server` had to override a stale opt-out flag.
    pub fn corrects_stale_opt_out(subscriptions: &UserSubscriptions) -> bool {
        !subscriptions.wants_marketing_emails && !subscriptions.subscribed_keys.is_empty()
    }
}
