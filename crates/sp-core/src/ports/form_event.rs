use serde::{Deserialize, Serialize};

use crate::preference::FormView;

/// Elements the controller can ask the view to focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusTarget {
    ErrorSummary,
}

/// Outbound notifications from the form controller to the view layer.
#[async_trait::async_trait]
pub trait FormEventPort: Send + Sync {
    async fn emit_form_changed(&self, view: FormView);

    /// Called after the state update that produced the error has been emitted.
    async fn request_focus(&self, target: FocusTarget);
}
