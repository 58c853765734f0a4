use serde::{Deserialize, Serialize};

use super::{FormData, FormStatus, ValidationState};
use crate::newsletter::{selected_labels, Newsletter};

/// Read-only snapshot handed to the view layer after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub form_data: FormData,
    pub form_status: FormStatus,
    pub validation_state: ValidationState,
    pub newsletters: Vec<Newsletter>,
}

impl FormView {
    /// Human-readable list of the selected newsletters.
    pub fn selected_labels(&self) -> String {
        selected_labels(&self.form_data.selected_newsletters, &self.newsletters)
    }
}
