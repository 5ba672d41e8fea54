//! `rebound fetch <path>` – GET with retries and print the body.

use anyhow::{Context, Result};
use rebound_core::cancel::CancelToken;
use rebound_core::client::RetryingClient;
use rebound_core::config::ReboundConfig;
use std::io::Write;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    pub path: String,
    pub base_url: Option<String>,
    pub max_attempts: Option<u32>,
    pub deadline: Option<u64>,
}

/// Apply command-line overrides on top of the loaded config.
pub(crate) fn effective_config(cfg: &ReboundConfig, args: &FetchArgs) -> ReboundConfig {
    let mut cfg = cfg.clone();
    if let Some(base_url) = &args.base_url {
        cfg.base_url = base_url.clone();
    }
    if let Some(max_attempts) = args.max_attempts {
        let mut retry = cfg.retry_config();
        retry.max_attempts = max_attempts;
        cfg.retry = Some(retry);
    }
    cfg
}

pub async fn run_fetch(cfg: &ReboundConfig, args: FetchArgs) -> Result<()> {
    let cfg = effective_config(cfg, &args);
    let client = RetryingClient::from_config(&cfg).context("invalid configuration")?;

    let cancel = match args.deadline {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling fetch");
                cancel.cancel();
            }
        }
    });

    let path = args.path;
    let body = tokio::task::spawn_blocking(move || client.get(&path, &cancel))
        .await
        .context("fetch task join")?;
    interrupt.abort();

    let body = body?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&body)?;
    stdout.flush()?;
    Ok(())
}
