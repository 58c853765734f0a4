//! End-to-end flows against the in-memory preferences backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use sp_app::{ControllerError, PreferenceFormController, RetryPolicy};
use sp_core::newsletter::{default_catalog, NewsletterSelection};
use sp_core::ports::{FocusTarget, FormEventPort, PreferenceApiError, UserSubscriptions};
use sp_core::preference::state_machine::LEARNING_LEVEL_REQUIRED;
use sp_core::preference::{compute_diff, FieldName, TextField};
use sp_core::{FormView, LearningLevel, NewsletterKey, SessionContext, Stage, SubmitStatus};
use sp_infra::api::{ApiOperation, InMemoryPreferenceApi, LatencyConfig};

#[derive(Default)]
struct RecordingEvents {
    views: Mutex<Vec<FormView>>,
    focus: Mutex<Vec<FocusTarget>>,
}

impl RecordingEvents {
    fn stages(&self) -> Vec<(Stage, SubmitStatus)> {
        self.views
            .lock()
            .unwrap()
            .iter()
            .map(|view| (view.form_status.current_stage, view.form_status.status))
            .collect()
    }

    fn emitted(&self) -> usize {
        self.views.lock().unwrap().len()
    }
}

#[async_trait]
impl FormEventPort for RecordingEvents {
    async fn emit_form_changed(&self, view: FormView) {
        self.views.lock().unwrap().push(view);
    }

    async fn request_focus(&self, target: FocusTarget) {
        self.focus.lock().unwrap().push(target);
    }
}

struct Harness {
    controller: Arc<PreferenceFormController>,
    api: Arc<InMemoryPreferenceApi>,
    events: Arc<RecordingEvents>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn harness(session: SessionContext, api: InMemoryPreferenceApi, retry: RetryPolicy) -> Harness {
    init_tracing();
    let api = Arc::new(api);
    let events = Arc::new(RecordingEvents::default());
    let controller = Arc::new(PreferenceFormController::new(
        session,
        api.clone(),
        events.clone(),
        retry,
    ));
    Harness {
        controller,
        api,
        events,
    }
}

fn subscribed(keys: &[&str], wants_marketing_emails: bool) -> UserSubscriptions {
    UserSubscriptions {
        subscribed_keys: keys.iter().map(|key| NewsletterKey::from(*key)).collect(),
        wants_marketing_emails,
        learning_level: None,
    }
}

async fn fill_anonymous(controller: &PreferenceFormController) {
    controller
        .on_field_change(TextField::FirstName, "Ada")
        .await
        .unwrap();
    controller
        .on_field_change(TextField::Email, "ada@example.com")
        .await
        .unwrap();
    controller
        .on_field_change(TextField::ConfirmEmail, "ada@example.com")
        .await
        .unwrap();
    controller.on_toggle_newsletter("sefaria_news").await.unwrap();
}

const RIVKA: &str = "rivka@example.com";

#[tokio::test]
async fn anonymous_signup_reaches_confirmation() {
    let h = harness(
        SessionContext::anonymous(),
        InMemoryPreferenceApi::default(),
        RetryPolicy::none(),
    );
    h.controller.mount().await.unwrap();
    fill_anonymous(&h.controller).await;

    let view = h.controller.on_submit().await.unwrap();

    assert_eq!(view.form_status.current_stage, Stage::Confirmation);
    assert_eq!(view.form_status.status, SubmitStatus::Success);
    assert!(view.validation_state.field_errors.is_empty());
    assert_eq!(h.controller.selected_labels().await, "Sefaria News & Resources");

    let stages = h.events.stages();
    let submitting = stages
        .iter()
        .position(|s| *s == (Stage::Selection, SubmitStatus::Submitting))
        .expect("submitting state emitted");
    assert_eq!(
        stages[submitting + 1],
        (Stage::Confirmation, SubmitStatus::Success)
    );

    assert_eq!(h.api.calls(ApiOperation::Subscribe).await, 1);
    let stored = h.api.user("ada@example.com").await.unwrap();
    assert_eq!(stored.subscribed_keys, vec![NewsletterKey::from("sefaria_news")]);
}

#[tokio::test]
async fn authenticated_change_sends_full_selection_once() {
    let h = harness(
        SessionContext::authenticated(RIVKA),
        InMemoryPreferenceApi::default().with_user(RIVKA, subscribed(&["sefaria_news"], true)),
        RetryPolicy::none(),
    );
    let mounted = h.controller.mount().await.unwrap();
    assert!(mounted.form_data.selected_newsletters.is_selected("sefaria_news"));
    assert_eq!(mounted.form_data.email, RIVKA);

    h.controller.on_toggle_newsletter("sefaria_news").await.unwrap();
    h.controller.on_toggle_newsletter("text_updates").await.unwrap();

    let view = h.controller.on_submit().await.unwrap();
    assert_eq!(
        (view.form_status.current_stage, view.form_status.status),
        (Stage::Confirmation, SubmitStatus::Success)
    );

    let diff = compute_diff(
        &NewsletterSelection::from_keys(["sefaria_news"]),
        &view.form_data.selected_newsletters,
    );
    assert_eq!(diff.added, vec![NewsletterKey::from("text_updates")]);
    assert_eq!(diff.removed, vec![NewsletterKey::from("sefaria_news")]);

    assert_eq!(h.api.calls(ApiOperation::UpdatePreferences).await, 1);
    let stored = h.api.user(RIVKA).await.unwrap();
    assert_eq!(stored.subscribed_keys, vec![NewsletterKey::from("text_updates")]);
    assert!(stored.wants_marketing_emails);
}

#[tokio::test]
async fn resubmitting_unchanged_preferences_makes_no_call() {
    let h = harness(
        SessionContext::authenticated(RIVKA),
        InMemoryPreferenceApi::default()
            .with_user(RIVKA, subscribed(&["sefaria_news", "text_updates"], true)),
        RetryPolicy::none(),
    );
    h.controller.mount().await.unwrap();

    // Toggling back and forth ends where it started.
    h.controller.on_toggle_newsletter("text_updates").await.unwrap();
    h.controller.on_toggle_newsletter("text_updates").await.unwrap();

    let view = h.controller.on_submit().await.unwrap();
    assert_eq!(
        (view.form_status.current_stage, view.form_status.status),
        (Stage::Confirmation, SubmitStatus::Idle)
    );
    assert_eq!(h.api.calls(ApiOperation::UpdatePreferences).await, 0);
}

#[tokio::test]
async fn stale_opt_out_is_corrected_for_display_only() {
    let h = harness(
        SessionContext::authenticated(RIVKA),
        InMemoryPreferenceApi::default().with_user(RIVKA, subscribed(&["sefaria_news"], false)),
        RetryPolicy::none(),
    );
    let view = h.controller.mount().await.unwrap();
    assert!(view.form_data.wants_marketing_emails);
    assert_eq!(h.api.calls(ApiOperation::UpdatePreferences).await, 0);

    let view = h.controller.on_submit().await.unwrap();
    assert_eq!(
        (view.form_status.current_stage, view.form_status.status),
        (Stage::Confirmation, SubmitStatus::Idle)
    );
    assert_eq!(h.api.calls(ApiOperation::UpdatePreferences).await, 0);
    assert!(!h.api.user(RIVKA).await.unwrap().wants_marketing_emails);
}

#[tokio::test]
async fn explicit_opt_out_with_empty_selection_is_sent() {
    let h = harness(
        SessionContext::authenticated(RIVKA),
        InMemoryPreferenceApi::default().with_user(RIVKA, subscribed(&["sefaria_news"], true)),
        RetryPolicy::none(),
    );
    h.controller.mount().await.unwrap();
    h.controller.on_toggle_newsletter("sefaria_news").await.unwrap();
    h.controller.on_set_wants_marketing(false).await.unwrap();

    let view = h.controller.on_submit().await.unwrap();
    assert_eq!(view.form_status.status, SubmitStatus::Success);

    let stored = h.api.user(RIVKA).await.unwrap();
    assert!(stored.subscribed_keys.is_empty());
    assert!(!stored.wants_marketing_emails);
}

#[tokio::test]
async fn empty_selection_without_opt_out_is_a_validation_error() {
    let h = harness(
        SessionContext::authenticated(RIVKA),
        InMemoryPreferenceApi::default().with_user(RIVKA, subscribed(&["sefaria_news"], true)),
        RetryPolicy::none(),
    );
    h.controller.mount().await.unwrap();
    h.controller.on_toggle_newsletter("sefaria_news").await.unwrap();

    let view = h.controller.on_submit().await.unwrap();
    assert_eq!(view.form_status.status, SubmitStatus::Error);
    assert!(view.validation_state.field_errors.contains(FieldName::Newsletters));
    assert_eq!(h.api.calls(ApiOperation::UpdatePreferences).await, 0);
}

#[tokio::test]
async fn blur_on_fresh_form_yields_no_error() {
    let h = harness(
        SessionContext::anonymous(),
        InMemoryPreferenceApi::default(),
        RetryPolicy::none(),
    );
    h.controller.mount().await.unwrap();

    for field in FieldName::ALL {
        let view = h.controller.on_field_blur(field).await.unwrap();
        assert!(view.validation_state.field_errors.is_empty());
    }
    assert!(h.events.focus.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn double_submit_issues_one_call() {
    let h = harness(
        SessionContext::anonymous(),
        InMemoryPreferenceApi::new(LatencyConfig::fixed(Duration::from_millis(200))),
        RetryPolicy::none(),
    );
    fill_anonymous(&h.controller).await;

    let (first, second) = tokio::join!(h.controller.on_submit(), h.controller.on_submit());

    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first.form_status.status, SubmitStatus::Success);
    assert_eq!(second.form_status.status, SubmitStatus::Submitting);
    assert_eq!(h.api.calls(ApiOperation::Subscribe).await, 1);
}

#[tokio::test(start_paused = true)]
async fn late_response_after_dispose_is_dropped() {
    let h = harness(
        SessionContext::anonymous(),
        InMemoryPreferenceApi::new(LatencyConfig::fixed(Duration::from_millis(500))),
        RetryPolicy::none(),
    );
    fill_anonymous(&h.controller).await;

    let controller = h.controller.clone();
    let submit = tokio::spawn(async move { controller.on_submit().await });
    while h.api.calls(ApiOperation::Subscribe).await == 0 {
        tokio::task::yield_now().await;
    }

    h.controller.dispose();
    let emitted_at_dispose = h.events.emitted();

    assert_eq!(submit.await.unwrap().unwrap_err(), ControllerError::Disposed);
    assert_eq!(h.events.emitted(), emitted_at_dispose);

    let view = h.controller.view().await;
    assert_eq!(view.form_status.status, SubmitStatus::Submitting);
}

#[tokio::test(start_paused = true)]
async fn transport_failures_are_retried() {
    let api = InMemoryPreferenceApi::default();
    api.fail_next(ApiOperation::Subscribe, PreferenceApiError::transport("offline"))
        .await;
    api.fail_next(ApiOperation::Subscribe, PreferenceApiError::transport("offline"))
        .await;
    let h = harness(
        SessionContext::anonymous(),
        api,
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(50),
        },
    );
    fill_anonymous(&h.controller).await;

    let view = h.controller.on_submit().await.unwrap();
    assert_eq!(view.form_status.status, SubmitStatus::Success);
    assert_eq!(h.api.calls(ApiOperation::Subscribe).await, 3);
}

#[tokio::test]
async fn rejection_holds_the_stage_and_resubmit_recovers() {
    let api = InMemoryPreferenceApi::default();
    api.fail_next(
        ApiOperation::Subscribe,
        PreferenceApiError::rejected(Some(400), "Email address is not valid."),
    )
    .await;
    let h = harness(
        SessionContext::anonymous(),
        api,
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::ZERO,
        },
    );
    fill_anonymous(&h.controller).await;

    let view = h.controller.on_submit().await.unwrap();
    assert_eq!(
        (view.form_status.current_stage, view.form_status.status),
        (Stage::Selection, SubmitStatus::Error)
    );
    assert_eq!(
        view.form_status.error_message.as_deref(),
        Some("Email address is not valid.")
    );
    assert_eq!(h.api.calls(ApiOperation::Subscribe).await, 1);

    let view = h.controller.on_submit().await.unwrap();
    assert_eq!(view.form_status.status, SubmitStatus::Success);
    assert_eq!(view.form_status.error_message, None);
}

#[tokio::test]
async fn clean_submit_clears_errors_from_an_earlier_attempt() {
    let api = InMemoryPreferenceApi::default();
    api.fail_next(ApiOperation::Subscribe, PreferenceApiError::transport("offline"))
        .await;
    let h = harness(SessionContext::anonymous(), api, RetryPolicy::none());

    let view = h.controller.on_submit().await.unwrap();
    assert!(view.validation_state.field_errors.contains(FieldName::FirstName));

    // Fields fixed without blurring them.
    fill_anonymous(&h.controller).await;

    let view = h.controller.on_submit().await.unwrap();
    assert_eq!(
        (view.form_status.current_stage, view.form_status.status),
        (Stage::Selection, SubmitStatus::Error)
    );
    assert_eq!(view.form_status.error_message.as_deref(), Some("offline"));
    assert!(view.validation_state.field_errors.is_empty());

    let submitting = h
        .events
        .views
        .lock()
        .unwrap()
        .iter()
        .filter(|view| view.form_status.status == SubmitStatus::Submitting)
        .all(|view| view.validation_state.field_errors.is_empty());
    assert!(submitting);
}

#[tokio::test]
async fn learning_level_flow() {
    let h = harness(
        SessionContext::authenticated(RIVKA),
        InMemoryPreferenceApi::default().with_user(RIVKA, subscribed(&["sefaria_news"], true)),
        RetryPolicy::none(),
    );
    h.controller.mount().await.unwrap();
    h.controller.on_submit().await.unwrap();

    let view = h.controller.on_save_learning_level().await.unwrap();
    assert_eq!(
        (view.form_status.current_stage, view.form_status.status),
        (Stage::Confirmation, SubmitStatus::Error)
    );
    assert_eq!(
        view.form_status.error_message.as_deref(),
        Some(LEARNING_LEVEL_REQUIRED)
    );

    h.controller
        .on_select_learning_level(Some(LearningLevel::new(3).unwrap()))
        .await
        .unwrap();
    let view = h.controller.on_save_learning_level().await.unwrap();
    assert_eq!(
        (view.form_status.current_stage, view.form_status.status),
        (Stage::Success, SubmitStatus::Success)
    );
    assert_eq!(
        h.api.user(RIVKA).await.unwrap().learning_level,
        Some(LearningLevel::new(3).unwrap())
    );
}

#[tokio::test]
async fn skipping_the_learning_level_finishes_without_a_call() {
    let h = harness(
        SessionContext::anonymous(),
        InMemoryPreferenceApi::default(),
        RetryPolicy::none(),
    );
    fill_anonymous(&h.controller).await;
    h.controller.on_submit().await.unwrap();

    let view = h.controller.on_skip_learning_level().await.unwrap();
    assert_eq!(
        (view.form_status.current_stage, view.form_status.status),
        (Stage::Success, SubmitStatus::Idle)
    );
    assert_eq!(h.api.calls(ApiOperation::UpdateLearningLevel).await, 0);
}

#[tokio::test]
async fn catalog_failure_falls_back_silently() {
    let api = InMemoryPreferenceApi::default();
    api.fail_always(
        ApiOperation::ListNewsletters,
        PreferenceApiError::transport("offline"),
    )
    .await;
    let h = harness(SessionContext::anonymous(), api, RetryPolicy::none());

    let view = h.controller.mount().await.unwrap();
    assert_eq!(view.newsletters, default_catalog());
    assert_eq!(view.form_status.status, SubmitStatus::Idle);
    assert_eq!(view.form_status.error_message, None);
}

#[tokio::test(start_paused = true)]
async fn edits_made_during_mount_are_kept() {
    let h = harness(
        SessionContext::authenticated(RIVKA),
        InMemoryPreferenceApi::new(LatencyConfig::fixed(Duration::from_millis(300)))
            .with_user(RIVKA, subscribed(&["sefaria_news"], true)),
        RetryPolicy::none(),
    );

    let (mounted, _) = tokio::join!(h.controller.mount(), async {
        h.controller.on_toggle_newsletter("text_updates").await.unwrap()
    });

    let view = mounted.unwrap();
    assert!(view.form_data.selected_newsletters.is_selected("text_updates"));
    assert!(!view.form_data.selected_newsletters.is_selected("sefaria_news"));

    // The baseline was still captured, so submitting sends the difference.
    h.controller.on_toggle_newsletter("sefaria_news").await.unwrap();
    h.controller.on_submit().await.unwrap();
    assert_eq!(h.api.calls(ApiOperation::UpdatePreferences).await, 1);
}
