//! Form event sinks.

use async_trait::async_trait;
use tracing::{debug, info};

use sp_core::ports::{FocusTarget, FormEventPort};
use sp_core::FormView;

/// Sink that only records form events in the trace log.
///
/// Used by headless front-ends (the CLI) that read the view back from the
/// controller instead of rendering on every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFormEventPort;

#[async_trait]
impl FormEventPort for TracingFormEventPort {
    async fn emit_form_changed(&self, view: FormView) {
        debug!(
            stage = ?view.form_status.current_stage,
            status = ?view.form_status.status,
            field_errors = view.validation_state.field_errors.len(),
            "form changed"
        );
    }

    async fn request_focus(&self, target: FocusTarget) {
        info!(?target, "focus requested");
    }
}
