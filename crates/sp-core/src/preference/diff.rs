//! Selection diffing against the baseline.

use serde::{Deserialize, Serialize};

use super::{FormData, SubscriptionBaseline};
use crate::newsletter::{NewsletterKey, NewsletterSelection};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionDiff {
    pub added: Vec<NewsletterKey>,
    pub removed: Vec<NewsletterKey>,
}

impl SelectionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Selection diff plus the marketing opt-out flip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub diff: SelectionDiff,
    pub opt_out_changed: bool,
}

impl ChangeSet {
    /// True when submitting would not change anything server-side.
    pub fn is_no_op(&self) -> bool {
        self.diff.is_empty() && !self.opt_out_changed
    }
}

/// `added`: selected now but not initially. `removed`: selected initially but not now.
/// Each list follows the insertion order of the mapping it was read from.
pub fn compute_diff(initial: &NewsletterSelection, current: &NewsletterSelection) -> SelectionDiff {
    let added = current
        .selected_keys()
        .filter(|key| !initial.is_selected(key.as_str()))
        .cloned()
        .collect();
    let removed = initial
        .selected_keys()
        .filter(|key| !current.is_selected(key.as_str()))
        .cloned()
        .collect();
    SelectionDiff { added, removed }
}

pub fn compute_change_set(baseline: &SubscriptionBaseline, form: &FormData) -> ChangeSet {
    ChangeSet {
        diff: compute_diff(&baseline.initial_subscriptions, &form.selected_newsletters),
        opt_out_changed: form.wants_marketing_emails != baseline.initial_wants_marketing,
    }
}
