//! Built-in newsletter catalog.
//!
//! Used whenever the remote catalog cannot be loaded, and as a label source
//! for keys the remote catalog did not mention.

use super::{Newsletter, NewsletterKey, NewsletterSelection};

const DEFAULT_NEWSLETTERS: &[(&str, &str, &str)] = &[
    (
        "sefaria_news",
        "Sefaria News & Resources",
        "news-and-resources.svg",
    ),
    ("educator_resources", "Educator Resources", "educator-resources.svg"),
    ("text_updates", "New Text Updates", "new-text-alerts.svg"),
    (
        "parashah_series",
        "Weekly Parashah Study Series",
        "parashah-email.svg",
    ),
];

pub fn default_catalog() -> Vec<Newsletter> {
    DEFAULT_NEWSLETTERS
        .iter()
        .map(|(key, label, icon)| Newsletter::new(*key, *label, *icon))
        .collect()
}

/// Joins the labels of the selected newsletters with `", "`.
///
/// Labels come from `catalog` first, then the built-in catalog; a key unknown
/// to both is shown as-is.
pub fn selected_labels(selection: &NewsletterSelection, catalog: &[Newsletter]) -> String {
    let fallback = default_catalog();
    selection
        .selected_keys()
        .map(|key| label_for(key, catalog, &fallback))
        .collect::<Vec<_>>()
        .join(", ")
}

fn label_for(key: &NewsletterKey, catalog: &[Newsletter], fallback: &[Newsletter]) -> String {
    catalog
        .iter()
        .chain(fallback.iter())
        .find(|newsletter| &newsletter.key == key)
        .map(|newsletter| newsletter.label.clone())
        .unwrap_or_else(|| key.to_string())
}
