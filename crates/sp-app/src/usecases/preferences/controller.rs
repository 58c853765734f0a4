//! Preference form controller.
//!
//! Owns one form instance: applies user input, runs the pure state machine
//! and executes the resulting actions against the preferences service.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use sp_core::newsletter::{selected_labels, NewsletterKey};
use sp_core::ports::{FocusTarget, FormEventPort, PreferenceApiPort, UserSubscriptions};
use sp_core::preference::{
    compute_change_set, validate_all, validate_field, FieldName, FormAction, FormEvent,
    LearningLevel, SubmitCheck, SubscriptionBaseline, TextField,
};
use sp_core::{FormView, SessionContext};

use super::context::{FormState, PreferenceContext};
use super::{LoadInitialState, RetryPolicy, SaveLearningLevel, SubmitSelection};

/// Errors produced by the form controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("form controller has been disposed")]
    Disposed,
}

/// Controller behind the preference form.
///
/// The view reads [`FormView`] snapshots (from [`view`](Self::view) or the
/// [`FormEventPort`]) and calls the `on_*` handlers. Handlers return the view
/// after the call settled, or [`ControllerError::Disposed`] once the form is
/// gone.
pub struct PreferenceFormController {
    context: PreferenceContext,
    session: SessionContext,
    events: Arc<dyn FormEventPort>,

    load_initial_state: LoadInitialState,
    submit_selection: SubmitSelection,
    save_learning_level: SaveLearningLevel,
}

impl PreferenceFormController {
    pub fn new(
        session: SessionContext,
        api: Arc<dyn PreferenceApiPort>,
        events: Arc<dyn FormEventPort>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            context: PreferenceContext::new(&session),
            session,
            events,
            load_initial_state: LoadInitialState::new(api.clone(), retry),
            submit_selection: SubmitSelection::new(api.clone(), retry),
            save_learning_level: SaveLearningLevel::new(api, retry),
        }
    }

    /// Loads the catalog and, for authenticated sessions, the current
    /// subscriptions. Both requests run concurrently and each result is merged
    /// as soon as it arrives.
    pub async fn mount(&self) -> Result<FormView, ControllerError> {
        let span = info_span!("usecase.preference_form.mount", logged_in = self.session.is_logged_in);
        async {
            let catalog = async {
                let newsletters = self.load_initial_state.newsletters().await;
                self.update(|state| state.newsletters = newsletters).await
            };
            let subscriptions = async {
                let Some(email) = self.session.authenticated_email() else {
                    return Ok(());
                };
                match self.load_initial_state.subscriptions(email).await {
                    Some(fetched) => self.merge_subscriptions(fetched).await,
                    None => {
                        warn!("no subscription baseline, unchanged submissions will be sent");
                        Ok(())
                    }
                }
            };

            let (catalog, subscriptions) = tokio::join!(catalog, subscriptions);
            catalog?;
            subscriptions?;
            Ok(self.view().await)
        }
        .instrument(span)
        .await
    }

    /// Current read-only view.
    pub async fn view(&self) -> FormView {
        self.context.view().await
    }

    /// Labels of the selected newsletters, joined with ", ".
    pub async fn selected_labels(&self) -> String {
        self.context
            .read(|state| selected_labels(&state.form_data.selected_newsletters, &state.newsletters))
            .await
    }

    /// Tears the form down. Results of in-flight calls are dropped.
    pub fn dispose(&self) {
        if !self.context.is_disposed() {
            debug!("preference form disposed");
        }
        self.context.dispose();
    }

    pub async fn on_field_change(
        &self,
        field: TextField,
        value: impl Into<String>,
    ) -> Result<FormView, ControllerError> {
        let value = value.into();
        self.update(|state| {
            state.touched = true;
            state.form_data.set_text(field, value);
        })
        .await
    }

    /// Re-validates one field. Does nothing before the first submit attempt.
    pub async fn on_field_blur(&self, field: FieldName) -> Result<FormView, ControllerError> {
        let is_logged_in = self.session.is_logged_in;
        self.update(|state| {
            if !state.validation_state.has_attempted_submit {
                return;
            }
            let error = validate_field(field, &state.form_data, is_logged_in);
            state.validation_state.field_errors.apply(field, error);
        })
        .await
    }

    pub async fn on_toggle_newsletter(
        &self,
        key: impl Into<NewsletterKey>,
    ) -> Result<FormView, ControllerError> {
        let key = key.into();
        let is_logged_in = self.session.is_logged_in;
        self.update(|state| {
            state.touched = true;
            let selected = state.form_data.selected_newsletters.toggle(key.clone());
            debug!(key = %key, selected, "newsletter toggled");
            revalidate_newsletters(state, is_logged_in);
        })
        .await
    }

    pub async fn on_set_wants_marketing(
        &self,
        wants_marketing_emails: bool,
    ) -> Result<FormView, ControllerError> {
        let is_logged_in = self.session.is_logged_in;
        self.update(|state| {
            state.touched = true;
            state.form_data.wants_marketing_emails = wants_marketing_emails;
            revalidate_newsletters(state, is_logged_in);
        })
        .await
    }

    pub async fn on_select_learning_level(
        &self,
        level: Option<LearningLevel>,
    ) -> Result<FormView, ControllerError> {
        self.update(|state| state.form_data.learning_level = level)
            .await
    }

    /// Submits the selection stage.
    ///
    /// Ignored while a submission is in flight or outside the selection stage.
    pub async fn on_submit(&self) -> Result<FormView, ControllerError> {
        let span = info_span!("usecase.preference_form.submit");
        async {
            let is_logged_in = self.session.is_logged_in;
            let (view, actions) = {
                let mut state = self.context.lock().await.ok_or(ControllerError::Disposed)?;

                let errors = validate_all(&state.form_data, is_logged_in);
                let check = if !errors.is_empty() {
                    SubmitCheck::Invalid
                } else if is_logged_in
                    && state
                        .baseline
                        .as_ref()
                        .is_some_and(|baseline| compute_change_set(baseline, &state.form_data).is_no_op())
                {
                    SubmitCheck::Unchanged
                } else {
                    SubmitCheck::Ready
                };

                let Some(actions) = state.apply(FormEvent::SubmitRequested { check }) else {
                    debug!(status = ?state.form_status.status, "submit ignored");
                    return Ok(state.view());
                };
                if check == SubmitCheck::Unchanged {
                    info!("no changes to submit, skipping preferences call");
                }
                if check == SubmitCheck::Invalid {
                    debug!(errors = errors.len(), "submit blocked by validation");
                }
                // A clean check also clears errors left over from an earlier attempt.
                state.validation_state.has_attempted_submit = true;
                state.validation_state.field_errors = errors;
                (state.view(), actions)
            };

            self.settle(view, actions).await
        }
        .instrument(span)
        .await
    }

    pub async fn on_save_learning_level(&self) -> Result<FormView, ControllerError> {
        let span = info_span!("usecase.preference_form.save_learning_level");
        async {
            let (view, actions) = {
                let mut state = self.context.lock().await.ok_or(ControllerError::Disposed)?;
                let level = state.form_data.learning_level;
                match state.apply(FormEvent::SaveLearningLevelRequested { level }) {
                    Some(actions) => (state.view(), actions),
                    None => return Ok(state.view()),
                }
            };
            self.settle(view, actions).await
        }
        .instrument(span)
        .await
    }

    pub async fn on_skip_learning_level(&self) -> Result<FormView, ControllerError> {
        self.dispatch(FormEvent::SkipLearningLevel).await
    }

    async fn dispatch(&self, event: FormEvent) -> Result<FormView, ControllerError> {
        let span = info_span!("usecase.preference_form.dispatch", event = ?event);
        async {
            let (view, actions) = self.commit(event).await?;
            self.settle(view, actions).await
        }
        .instrument(span)
        .await
    }

    /// Applies one event under the lock. Ignored events yield no actions.
    async fn commit(&self, event: FormEvent) -> Result<(FormView, Vec<FormAction>), ControllerError> {
        let mut state = self.context.lock().await.ok_or(ControllerError::Disposed)?;
        let actions = state.apply(event).unwrap_or_default();
        Ok((state.view(), actions))
    }

    /// Emits the committed view, then runs its actions and any follow-up
    /// transitions until the flow is quiet again.
    async fn settle(
        &self,
        mut view: FormView,
        mut actions: Vec<FormAction>,
    ) -> Result<FormView, ControllerError> {
        loop {
            self.events.emit_form_changed(view.clone()).await;

            let mut follow_ups = Vec::new();
            for action in actions {
                debug!(?action, "preference form executing action");
                if let Some(event) = self.execute_action(action, &view).await {
                    follow_ups.push(event);
                }
            }

            let Some(event) = follow_ups.pop() else {
                return Ok(view);
            };
            (view, actions) = self.commit(event).await.inspect_err(|_| {
                debug!("late preferences result dropped after dispose");
            })?;
        }
    }

    /// Runs one action. `committed` is the view the action was produced with.
    async fn execute_action(&self, action: FormAction, committed: &FormView) -> Option<FormEvent> {
        match action {
            FormAction::FocusErrorSummary => {
                self.focus_deferred(FocusTarget::ErrorSummary);
                None
            }
            FormAction::SubmitSelection => {
                let baseline = self.context.read(|state| state.baseline.clone()).await;
                let event = match self
                    .submit_selection
                    .execute(&self.session, &committed.form_data, baseline.as_ref())
                    .await
                {
                    Ok(outcome) => {
                        debug!(subscribed = outcome.subscribed_keys.len(), "selection submitted");
                        FormEvent::SubmitSucceeded
                    }
                    Err(err) => FormEvent::SubmitFailed {
                        message: err.user_message(),
                    },
                };
                Some(event)
            }
            FormAction::SaveLearningLevel { level } => {
                let email = self
                    .session
                    .authenticated_email()
                    .unwrap_or(committed.form_data.email.as_str());
                let event = match self.save_learning_level.execute(email, level).await {
                    Ok(_) => FormEvent::LearningLevelSaved,
                    Err(err) => FormEvent::LearningLevelFailed {
                        message: err.user_message(),
                    },
                };
                Some(event)
            }
        }
    }

    /// Focus must land after the view rendered the update, so it is requested
    /// from a separate task on a later scheduler tick.
    fn focus_deferred(&self, target: FocusTarget) {
        let context = self.context.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            if context.is_disposed() {
                return;
            }
            events.request_focus(target).await;
        });
    }

    /// Captures the server baseline and, if the user has not edited the form
    /// yet, seeds the form from it.
    async fn merge_subscriptions(&self, fetched: UserSubscriptions) -> Result<(), ControllerError> {
        let baseline = SubscriptionBaseline::from_server(&fetched);
        if SubscriptionBaseline::corrects_stale_opt_out(&fetched) {
            info!("stale marketing opt-out with active subscriptions, showing as opted in");
        }

        self.update(|state| {
            if state.baseline.is_some() {
                warn!("subscription baseline already captured, ignoring refetch");
                return;
            }
            if !state.touched {
                state.form_data.selected_newsletters = baseline.initial_subscriptions.clone();
                state.form_data.wants_marketing_emails = baseline.initial_wants_marketing;
                if fetched.learning_level.is_some() {
                    state.form_data.learning_level = fetched.learning_level;
                }
            } else {
                debug!("form already edited, baseline captured without seeding");
            }
            state.baseline = Some(baseline);
        })
        .await
        .map(|_| ())
    }

    /// Applies a data-only change and emits the result.
    async fn update(&self, f: impl FnOnce(&mut FormState)) -> Result<FormView, ControllerError> {
        let view = {
            let mut state = self.context.lock().await.ok_or(ControllerError::Disposed)?;
            f(&mut state);
            state.view()
        };
        self.events.emit_form_changed(view.clone()).await;
        Ok(view)
    }
}

impl Drop for PreferenceFormController {
    fn drop(&mut self) {
        self.context.dispose();
    }
}

/// The newsletters rule depends on the selection and the marketing flag, and
/// checkboxes have no blur of their own.
fn revalidate_newsletters(state: &mut FormState, is_logged_in: bool) {
    if state.validation_state.has_attempted_submit {
        let error = validate_field(FieldName::Newsletters, &state.form_data, is_logged_in);
        state
            .validation_state
            .field_errors
            .apply(FieldName::Newsletters, error);
    }
}
