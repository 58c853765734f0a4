//! # Pure Data Module - Data Transfer Objects Only
//!
//! ## Responsibilities
//!
//! - Define configuration data structures
//! - Provide TOML → DTO mapping
//!
//! ## Prohibited
//!
//! **No business logic, no validation, no default value calculation.**
//! Missing values map to empty facts (`""`, `0`, `false`); deciding what an
//! empty value means is the wiring layer's job.

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Which backend to wire: `"mock"` or `"http"` (raw string, not checked here)
    pub api_backend: String,

    /// Base URL of the preferences service
    pub api_base_url: String,

    /// Per-request timeout for the HTTP backend
    pub api_timeout_ms: u64,

    /// Attempts for retryable failures (including the first one)
    pub retry_max_attempts: u32,

    /// Linear backoff step between attempts
    pub retry_backoff_ms: u64,

    /// Fixed latency of the in-memory backend
    pub mock_latency_ms: u64,

    /// Upper bound of random extra latency of the in-memory backend
    pub mock_jitter_ms: u64,

    /// RNG seed for the jitter, so runs are reproducible
    pub mock_seed: u64,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// **Prohibited**: This method must NOT contain any validation
    /// or default value logic. Empty strings are valid "facts".
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let str_at = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let int_at = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
                .unwrap_or(0)
                .max(0)
        };

        Ok(Self {
            api_backend: str_at("api", "backend"),
            api_base_url: str_at("api", "base_url"),
            api_timeout_ms: int_at("api", "timeout_ms") as u64,
            retry_max_attempts: u32::try_from(int_at("retry", "max_attempts")).unwrap_or(u32::MAX),
            retry_backoff_ms: int_at("retry", "backoff_ms") as u64,
            mock_latency_ms: int_at("mock", "latency_ms") as u64,
            mock_jitter_ms: int_at("mock", "jitter_ms") as u64,
            mock_seed: int_at("mock", "seed") as u64,
        })
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self {
            api_backend: String::new(),
            api_base_url: String::new(),
            api_timeout_ms: 0,
            retry_max_attempts: 0,
            retry_backoff_ms: 0,
            mock_latency_ms: 0,
            mock_jitter_ms: 0,
            mock_seed: 0,
        }
    }
}
