use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{PolicyError, RetryPolicy, DEFAULT_RETRYABLE_STATUSES};

fn default_retryable_statuses() -> Vec<u16> {
    DEFAULT_RETRYABLE_STATUSES.to_vec()
}

fn default_true() -> bool {
    true
}

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per call (including the first).
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub initial_delay_ms: u64,
    /// Growth factor applied to the delay after each failed attempt.
    pub multiplier: f64,
    /// Upper bound on a single backoff delay, in seconds.
    pub max_delay_secs: u64,
    /// Exact status codes that are retried. Nothing else is.
    #[serde(default = "default_retryable_statuses")]
    pub retryable_statuses: Vec<u16>,
    /// Retry when no response was received at all (refused, DNS, timeout).
    #[serde(default = "default_true")]
    pub retry_transport_failures: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 1000,
            multiplier: 1.2,
            max_delay_secs: 30,
            retryable_statuses: default_retryable_statuses(),
            retry_transport_failures: true,
        }
    }
}

impl RetryConfig {
    /// Validate into a policy.
    pub fn to_policy(&self) -> Result<RetryPolicy, PolicyError> {
        RetryPolicy::builder()
            .max_attempts(self.max_attempts)
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .multiplier(self.multiplier)
            .max_delay(Duration::from_secs(self.max_delay_secs))
            .retryable_statuses(self.retryable_statuses.iter().copied())
            .retry_transport_failures(self.retry_transport_failures)
            .build()
    }
}

/// Global configuration loaded from `~/.config/rebound/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReboundConfig {
    /// Base URL that request paths are resolved against.
    pub base_url: String,
    /// Connect timeout per attempt, in seconds.
    pub connect_timeout_secs: u64,
    /// Overall timeout per attempt, in seconds.
    pub timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for ReboundConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            connect_timeout_secs: 15,
            timeout_secs: 30,
            retry: None,
        }
    }
}

impl ReboundConfig {
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, PolicyError> {
        self.retry_config().to_policy()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rebound")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ReboundConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ReboundConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<ReboundConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ReboundConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
