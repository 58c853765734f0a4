//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - Read TOML configuration files / 读取 TOML 配置文件
//! - Parse TOML into the AppConfig DTO / 将 TOML 解析为 AppConfig DTO
//! - Report I/O and parsing errors with context / 报告带上下文的 I/O 和解析错误
//!
//! No validation and no defaults here. Accept whatever is in the file;
//! the wiring layer decides what empty values mean.
//! 此处不做验证，也不补默认值。

use anyhow::Context;
use std::path::Path;
use sp_core::config::AppConfig;

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_load_config_reads_valid_toml() {
        let temp_file = write_config(
            r#"
            [api]
            backend = "http"
            base_url = "https://prefs.example.com/api"
            timeout_ms = 5000

            [retry]
            max_attempts = 4
            backoff_ms = 250

            [mock]
            latency_ms = 20
            jitter_ms = 5
            seed = 42
        "#,
        );

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.api_backend, "http");
        assert_eq!(config.api_base_url, "https://prefs.example.com/api");
        assert_eq!(config.api_timeout_ms, 5000);
        assert_eq!(config.retry_max_attempts, 4);
        assert_eq!(config.retry_backoff_ms, 250);
        assert_eq!(config.mock_latency_ms, 20);
        assert_eq!(config.mock_jitter_ms, 5);
        assert_eq!(config.mock_seed, 42);
    }

    /// Missing values are empty facts, not defaults
    /// 缺失的值是空事实，而不是默认值
    #[test]
    fn test_load_config_returns_empty_values_when_missing() {
        let temp_file = write_config(
            r#"
            [api]
            # backend is missing
        "#,
        );

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_load_config_rejects_invalid_toml() {
        let temp_file = write_config("[api\nbackend = ");
        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("TOML"), "got: {err}");
    }

    #[test]
    fn test_load_config_returns_io_error_on_file_not_found() {
        let err = load_config(Path::new("/this/path/does/not/exist/subprefs.toml")).unwrap_err();
        assert!(
            err.to_string().to_lowercase().contains("failed to read"),
            "Expected IO error message, got: {err}"
        );
    }
}
