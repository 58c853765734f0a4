//! Deterministic in-memory preferences backend.
//!
//! Behaves like the real service (same validation, same idempotency) with a
//! configurable latency and hooks for injecting failures. Used for local runs
//! and tests.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

use sp_core::newsletter::{default_catalog, Newsletter, NewsletterKey};
use sp_core::ports::{
    PreferenceApiError, PreferenceApiPort, SubscribeRequest, SubscribeResponse,
    UpdatePreferencesRequest, UpdatePreferencesResponse, UserSubscriptions,
};
use sp_core::preference::LearningLevel;

/// Operations of [`PreferenceApiPort`], used to address hooks and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    ListNewsletters,
    FetchUserSubscriptions,
    Subscribe,
    UpdatePreferences,
    UpdateLearningLevel,
}

#[derive(Debug, Clone)]
pub struct LatencyConfig {
    /// Delay applied to every call
    pub fixed: Duration,
    /// Upper bound of an extra random delay
    pub jitter: Duration,
    /// Seed of the jitter generator
    pub seed: u64,
}

impl LatencyConfig {
    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn fixed(fixed: Duration) -> Self {
        Self {
            fixed,
            jitter: Duration::ZERO,
            seed: 0,
        }
    }
}

#[derive(Default)]
struct FailurePlan {
    next: VecDeque<PreferenceApiError>,
    always: Option<PreferenceApiError>,
}

struct State {
    catalog: Vec<Newsletter>,
    users: HashMap<String, UserSubscriptions>,
    failures: HashMap<ApiOperation, FailurePlan>,
    calls: HashMap<ApiOperation, usize>,
    log: Vec<ApiOperation>,
    rng: StdRng,
}

pub struct InMemoryPreferenceApi {
    state: Mutex<State>,
    latency: LatencyConfig,
}

impl InMemoryPreferenceApi {
    pub fn new(latency: LatencyConfig) -> Self {
        Self {
            state: Mutex::new(State {
                catalog: default_catalog(),
                users: HashMap::new(),
                failures: HashMap::new(),
                calls: HashMap::new(),
                log: Vec::new(),
                rng: StdRng::seed_from_u64(latency.seed),
            }),
            latency,
        }
    }

    /// Replaces the served catalog.
    pub fn with_catalog(mut self, catalog: Vec<Newsletter>) -> Self {
        self.state.get_mut().catalog = catalog;
        self
    }

    /// Seeds an existing account.
    pub fn with_user(mut self, email: impl Into<String>, subscriptions: UserSubscriptions) -> Self {
        self.state.get_mut().users.insert(email.into(), subscriptions);
        self
    }

    /// Fails the next call of `operation` with `error`. Queued errors are used in order.
    pub async fn fail_next(&self, operation: ApiOperation, error: PreferenceApiError) {
        let mut state = self.state.lock().await;
        state.failures.entry(operation).or_default().next.push_back(error);
    }

    /// Fails every call of `operation` until [`clear_failures`](Self::clear_failures).
    pub async fn fail_always(&self, operation: ApiOperation, error: PreferenceApiError) {
        let mut state = self.state.lock().await;
        state.failures.entry(operation).or_default().always = Some(error);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    /// Number of calls made to `operation`, failed ones included.
    pub async fn calls(&self, operation: ApiOperation) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    /// Every call made so far, in order.
    pub async fn request_log(&self) -> Vec<ApiOperation> {
        self.state.lock().await.log.clone()
    }

    /// Stored state of an account.
    pub async fn user(&self, email: &str) -> Option<UserSubscriptions> {
        self.state.lock().await.users.get(email).cloned()
    }

    /// Counts the call, waits out the simulated latency and reports any injected failure.
    async fn begin(&self, operation: ApiOperation) -> Result<(), PreferenceApiError> {
        let (delay, failure) = {
            let mut state = self.state.lock().await;
            *state.calls.entry(operation).or_insert(0) += 1;
            state.log.push(operation);

            let jitter_ms = self.latency.jitter.as_millis() as u64;
            let jitter = if jitter_ms == 0 {
                Duration::ZERO
            } else {
                Duration::from_millis(state.rng.random_range(0..=jitter_ms))
            };

            let failure = state.failures.get_mut(&operation).and_then(|plan| {
                plan.next.pop_front().or_else(|| plan.always.clone())
            });
            (self.latency.fixed + jitter, failure)
        };

        debug!(?operation, ?delay, injected_failure = failure.is_some(), "in-memory preferences call");
        if !delay.is_zero() {
            sleep(delay).await;
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryPreferenceApi {
    fn default() -> Self {
        Self::new(LatencyConfig::none())
    }
}

fn check_known_keys<'a>(
    catalog: &[Newsletter],
    mut keys: impl Iterator<Item = &'a NewsletterKey>,
) -> Result<(), PreferenceApiError> {
    match keys.find(|key| !catalog.iter().any(|newsletter| &newsletter.key == *key)) {
        Some(unknown) => Err(PreferenceApiError::rejected(
            Some(400),
            format!("Unknown newsletter: {unknown}"),
        )),
        None => Ok(()),
    }
}

#[async_trait]
impl PreferenceApiPort for InMemoryPreferenceApi {
    async fn list_newsletters(&self) -> Result<Vec<Newsletter>, PreferenceApiError> {
        self.begin(ApiOperation::ListNewsletters).await?;
        Ok(self.state.lock().await.catalog.clone())
    }

    async fn fetch_user_subscriptions(
        &self,
        email: &str,
    ) -> Result<UserSubscriptions, PreferenceApiError> {
        self.begin(ApiOperation::FetchUserSubscriptions).await?;
        let state = self.state.lock().await;
        Ok(state.users.get(email).cloned().unwrap_or(UserSubscriptions {
            subscribed_keys: Vec::new(),
            wants_marketing_emails: true,
            learning_level: None,
        }))
    }

    async fn subscribe(
        &self,
        request: &SubscribeRequest,
    ) -> Result<SubscribeResponse, PreferenceApiError> {
        self.begin(ApiOperation::Subscribe).await?;
        request.check()?;

        let mut state = self.state.lock().await;
        check_known_keys(&state.catalog, request.newsletters.selected_keys())?;

        // Signing up adds lists; it never removes existing ones, so a replay is harmless.
        let user = state
            .users
            .entry(request.email.clone())
            .or_insert_with(|| UserSubscriptions {
                wants_marketing_emails: true,
                ..UserSubscriptions::default()
            });
        for key in request.newsletters.selected_keys() {
            if !user.subscribed_keys.contains(key) {
                user.subscribed_keys.push(key.clone());
            }
        }
        user.wants_marketing_emails = true;

        Ok(SubscribeResponse {
            subscribed_keys: user.subscribed_keys.clone(),
        })
    }

    async fn update_preferences(
        &self,
        request: &UpdatePreferencesRequest,
    ) -> Result<UpdatePreferencesResponse, PreferenceApiError> {
        self.begin(ApiOperation::UpdatePreferences).await?;

        let mut state = self.state.lock().await;
        check_known_keys(&state.catalog, request.newsletters.selected_keys())?;

        let user = state.users.entry(request.email.clone()).or_default();
        user.subscribed_keys = request.newsletters.selected_keys().cloned().collect();
        user.wants_marketing_emails = !request.marketing_opt_out;

        Ok(UpdatePreferencesResponse {
            subscribed_keys: user.subscribed_keys.clone(),
            marketing_opt_out: request.marketing_opt_out,
        })
    }

    async fn update_learning_level(
        &self,
        email: &str,
        level: LearningLevel,
    ) -> Result<LearningLevel, PreferenceApiError> {
        self.begin(ApiOperation::UpdateLearningLevel).await?;

        let mut state = self.state.lock().await;
        let user = state
            .users
            .entry(email.to_string())
            .or_insert_with(|| UserSubscriptions {
                wants_marketing_emails: true,
                ..UserSubscriptions::default()
            });
        user.learning_level = Some(level);
        Ok(level)
    }
}
