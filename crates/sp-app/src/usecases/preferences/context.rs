use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use sp_core::newsletter::{default_catalog, Newsletter};
use sp_core::preference::{FormAction, FormEvent, FormStateMachine, Stage, SubscriptionBaseline};
use sp_core::{FormData, FormStatus, FormView, SessionContext, ValidationState};

/// Mutable state of one form instance.
pub(crate) struct FormState {
    pub form_data: FormData,
    pub form_status: FormStatus,
    pub validation_state: ValidationState,
    pub newsletters: Vec<Newsletter>,
    /// Written at most once. Anonymous sessions start with the empty baseline.
    pub baseline: Option<SubscriptionBaseline>,
    /// Set by the first user edit; server state no longer seeds the form after that.
    pub touched: bool,
}

impl FormState {
    fn new(session: &SessionContext) -> Self {
        Self {
            form_data: FormData::for_session(session),
            form_status: FormStatus::initial(session),
            validation_state: ValidationState::default(),
            newsletters: default_catalog(),
            baseline: (!session.is_logged_in).then(SubscriptionBaseline::empty),
            touched: false,
        }
    }

    pub fn view(&self) -> FormView {
        FormView {
            form_data: self.form_data.clone(),
            form_status: self.form_status.clone(),
            validation_state: self.validation_state.clone(),
            newsletters: self.newsletters.clone(),
        }
    }

    /// Runs one transition and commits it.
    ///
    /// Returns `None` when the machine ignored the event.
    pub fn apply(&mut self, event: FormEvent) -> Option<Vec<FormAction>> {
        let from = self.form_status.clone();
        let event_name = format!("{:?}", event);
        let (next, actions) = FormStateMachine::transition(from.clone(), event);
        if next == from && actions.is_empty() {
            return None;
        }

        info!(
            from = ?(from.current_stage, from.status),
            to = ?(next.current_stage, next.status),
            event = %event_name,
            "preference form transition"
        );
        if next.current_stage != Stage::Selection {
            self.validation_state.field_errors = Default::default();
        }
        self.form_status = next;
        Some(actions)
    }
}

/// Shared form context.
///
/// Cloned into deferred tasks so they can check for disposal without holding
/// the controller. The state lock is never held across a call to the
/// preferences service.
#[derive(Clone)]
pub(crate) struct PreferenceContext {
    state: Arc<Mutex<FormState>>,
    disposed: Arc<AtomicBool>,
}

impl PreferenceContext {
    pub fn new(session: &SessionContext) -> Self {
        Self {
            state: Arc::new(Mutex::new(FormState::new(session))),
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Locks the state for a write. `None` once disposed.
    pub async fn lock(&self) -> Option<MutexGuard<'_, FormState>> {
        let guard = self.state.lock().await;
        (!self.is_disposed()).then_some(guard)
    }

    /// Snapshot for readers. Still available after dispose.
    pub async fn view(&self) -> FormView {
        self.state.lock().await.view()
    }

    pub async fn read<T>(&self, f: impl FnOnce(&FormState) -> T) -> T {
        f(&*self.state.lock().await)
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}
