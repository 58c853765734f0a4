//! # Dependency Injection / 依赖注入模块
//!
//! Turns an [`AppConfig`] into concrete adapters and hands them to the
//! controller as port trait objects. This is the only place that depends on
//! `sp-infra` and `sp-app` at the same time; it assembles, it does not decide
//! business rules.
//! 这是唯一同时依赖 sp-infra 和 sp-app 的地方，仅用于组装。

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::info;

use sp_app::{PreferenceFormController, RetryPolicy};
use sp_core::config::AppConfig;
use sp_core::ports::{FormEventPort, PreferenceApiPort};
use sp_core::SessionContext;
use sp_infra::api::{
    ApiBackend, HttpPreferenceApi, HttpPreferenceApiConfig, InMemoryPreferenceApi, LatencyConfig,
};
use sp_infra::TracingFormEventPort;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration used when no file is given: the in-memory backend with a
/// small latency and a short retry budget.
pub fn default_config() -> AppConfig {
    AppConfig {
        api_backend: "mock".to_string(),
        api_base_url: String::new(),
        api_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
        retry_max_attempts: 3,
        retry_backoff_ms: 200,
        mock_latency_ms: 150,
        mock_jitter_ms: 100,
        mock_seed: 7,
    }
}

/// Picks the backend: an explicit override wins, then the config value.
/// An empty config value means the in-memory backend.
pub fn resolve_backend(config: &AppConfig, backend: Option<ApiBackend>) -> anyhow::Result<ApiBackend> {
    if let Some(backend) = backend {
        return Ok(backend);
    }
    if config.api_backend.trim().is_empty() {
        return Ok(ApiBackend::Mock);
    }
    config
        .api_backend
        .parse()
        .context("Invalid [api] backend in config")
}

pub fn build_preference_api(
    config: &AppConfig,
    backend: ApiBackend,
) -> anyhow::Result<Arc<dyn PreferenceApiPort>> {
    match backend {
        ApiBackend::Mock => {
            let latency = LatencyConfig {
                fixed: Duration::from_millis(config.mock_latency_ms),
                jitter: Duration::from_millis(config.mock_jitter_ms),
                seed: config.mock_seed,
            };
            info!(?latency, "using in-memory preferences backend");
            Ok(Arc::new(InMemoryPreferenceApi::new(latency)))
        }
        ApiBackend::Http => {
            if config.api_base_url.trim().is_empty() {
                bail!("[api] base_url is required for the http backend");
            }
            let timeout = match config.api_timeout_ms {
                0 => DEFAULT_TIMEOUT,
                ms => Duration::from_millis(ms),
            };
            info!(base_url = %config.api_base_url, ?timeout, "using HTTP preferences backend");
            let api = HttpPreferenceApi::new(HttpPreferenceApiConfig {
                base_url: config.api_base_url.clone(),
                timeout,
            })?;
            Ok(Arc::new(api))
        }
    }
}

/// Builds a controller for one form session.
pub fn build_controller(
    config: &AppConfig,
    backend: ApiBackend,
    session: SessionContext,
) -> anyhow::Result<PreferenceFormController> {
    let api = build_preference_api(config, backend)?;
    let events: Arc<dyn FormEventPort> = Arc::new(TracingFormEventPort);
    Ok(PreferenceFormController::new(
        session,
        api,
        events,
        RetryPolicy::from_config(config),
    ))
}
