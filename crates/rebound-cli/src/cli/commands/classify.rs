//! `rebound classify <status>` – show the verdict for a bare status code.

use anyhow::Result;
use rebound_core::config::ReboundConfig;
use rebound_core::retry::{classify_status, RetryPolicy, StatusClass};

pub(crate) fn describe(status: u16, policy: &RetryPolicy) -> &'static str {
    match classify_status(status, policy) {
        StatusClass::Success => "success",
        StatusClass::Retryable => "retryable",
        StatusClass::Permanent => "permanent",
    }
}

pub fn run_classify(cfg: &ReboundConfig, status: u16) -> Result<()> {
    let policy = cfg.retry_policy()?;
    println!("{} -> {}", status, describe(status, &policy));
    Ok(())
}
