//! `rebound policy` – print the effective retry policy.

use anyhow::Result;
use rebound_core::config::ReboundConfig;
use rebound_core::retry::RetryPolicy;

pub(crate) fn render(policy: &RetryPolicy) -> String {
    let statuses: Vec<String> = policy
        .retryable_statuses()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut out = String::new();
    out.push_str(&format!("max attempts:       {}\n", policy.max_attempts()));
    out.push_str(&format!("initial delay:      {:?}\n", policy.initial_delay()));
    out.push_str(&format!("multiplier:         {}\n", policy.multiplier()));
    out.push_str(&format!("max delay:          {:?}\n", policy.max_delay()));
    out.push_str(&format!("retryable statuses: {}\n", statuses.join(", ")));
    out.push_str(&format!(
        "retry transport:    {}\n",
        policy.retry_transport_failures()
    ));
    for (i, delay) in policy.schedule().enumerate() {
        out.push_str(&format!("  before attempt {}: wait {:?}\n", i + 2, delay));
    }
    out
}

pub fn run_policy(cfg: &ReboundConfig) -> Result<()> {
    let policy = cfg.retry_policy()?;
    print!("{}", render(&policy));
    Ok(())
}
