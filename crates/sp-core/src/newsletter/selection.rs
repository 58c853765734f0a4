use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::NewsletterKey;

/// Newsletter membership keyed by newsletter, in insertion order.
///
/// A key mapped to `false` and an absent key mean the same thing for
/// membership; the distinction only matters for what gets sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewsletterSelection(IndexMap<NewsletterKey, bool>);

impl NewsletterSelection {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builds a selection where every given key is selected.
    pub fn from_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<NewsletterKey>,
    {
        Self(keys.into_iter().map(|key| (key.into(), true)).collect())
    }

    /// Flips membership of `key` and returns the new value.
    pub fn toggle(&mut self, key: impl Into<NewsletterKey>) -> bool {
        let entry = self.0.entry(key.into()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    pub fn has_any_selected(&self) -> bool {
        self.0.values().any(|selected| *selected)
    }

    /// Keys mapped to `true`, in insertion order.
    pub fn selected_keys(&self) -> impl Iterator<Item = &NewsletterKey> {
        self.0
            .iter()
            .filter_map(|(key, selected)| selected.then_some(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NewsletterKey, bool)> {
        self.0.iter().map(|(key, selected)| (key, *selected))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<NewsletterKey>> FromIterator<(K, bool)> for NewsletterSelection {
    fn from_iter<T: IntoIterator<Item = (K, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
