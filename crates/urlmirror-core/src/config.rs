use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::CurlOptions;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per URL (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/urlmirror/config.toml`.
/// Missing keys fall back to the defaults below; CLI flags override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Error log written by `urlmirror run` when `--error-file` is not given.
    pub error_log: PathBuf,
    /// Number of URLs fetched concurrently. 1 keeps the run strictly sequential.
    pub jobs: usize,
    pub connect_timeout_secs: u64,
    /// Upper bound for a single transfer.
    pub timeout_secs: u64,
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    pub max_redirections: u32,
    pub user_agent: Option<String>,
    /// Optional retry policy; if missing, each URL is attempted once.
    pub retry: Option<RetryConfig>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            error_log: PathBuf::from("errors.log"),
            jobs: 1,
            connect_timeout_secs: 30,
            timeout_secs: 300,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
            user_agent: None,
            retry: None,
        }
    }
}

impl MirrorConfig {
    pub fn curl_options(&self) -> CurlOptions {
        CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
            max_redirections: self.max_redirections,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        self.retry.as_ref().map(RetryConfig::policy)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlmirror")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MirrorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: MirrorConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = MirrorConfig::default();
        assert_eq!(cfg.error_log, PathBuf::from("errors.log"));
        assert_eq!(cfg.jobs, 1);
        assert!(cfg.retry_policy().is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MirrorConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.error_log, cfg.error_log);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
        assert_eq!(parsed.max_redirections, cfg.max_redirections);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml = r#"
            error_log = "mirror-errors.log"
            jobs = 4
        "#;
        let cfg: MirrorConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.error_log, PathBuf::from("mirror-errors.log"));
        assert_eq!(cfg.jobs, 4);
        assert_eq!(cfg.connect_timeout_secs, 30);
        assert!(cfg.user_agent.is_none());
    }

    #[test]
    fn config_toml_retry_and_curl_options() {
        let toml = r#"
            timeout_secs = 60
            user_agent = "urlmirror/0.1"

            [retry]
            max_attempts = 4
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: MirrorConfig = toml::from_str(toml).unwrap();
        let curl = cfg.curl_options();
        assert_eq!(curl.timeout, Duration::from_secs(60));
        assert_eq!(curl.user_agent.as_deref(), Some("urlmirror/0.1"));
        let policy = cfg.retry_policy().unwrap();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(15));
    }
}
