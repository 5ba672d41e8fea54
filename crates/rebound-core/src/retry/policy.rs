use std::collections::BTreeSet;
use std::time::Duration;

use super::error::PolicyError;

/// Status codes retried when no explicit set is configured: request timeout,
/// too early, too many requests, bad gateway, service unavailable, gateway timeout.
pub const DEFAULT_RETRYABLE_STATUSES: [u16; 6] = [408, 425, 429, 502, 503, 504];

/// Error codes that never change on retry; refused in the retryable set.
const NON_TRANSIENT_STATUSES: [u16; 17] = [
    400, 401, 402, 403, 404, 405, 406, 407, 410, 411, 413, 414, 415, 416, 422, 501, 505,
];

/// Bounded geometric backoff over an explicit allow-list of status codes.
///
/// Only constructible through [`RetryPolicy::builder`] (or `Default`), so every
/// value in circulation is valid. Immutable once built and safe to share
/// between concurrent calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
    retryable_statuses: BTreeSet<u16>,
    retry_transport_failures: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1000),
            multiplier: 1.2,
            max_delay: Duration::from_secs(30),
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.into_iter().collect(),
            retry_transport_failures: true,
        }
    }
}

impl RetryPolicy {
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn retryable_statuses(&self) -> &BTreeSet<u16> {
        &self.retryable_statuses
    }

    pub fn retry_transport_failures(&self) -> bool {
        self.retry_transport_failures
    }

    /// Exact-code membership; there is no range matching.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Delay to wait after attempt `attempt` (1-based) failed transiently:
    /// `initial_delay * multiplier^(attempt-1)`, clamped to `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let nanos = self.initial_delay.as_nanos() as f64 * self.multiplier.powi(exp);
        if !nanos.is_finite() || nanos >= self.max_delay.as_nanos() as f64 {
            return self.max_delay;
        }
        // Rounding keeps e.g. 1000ms * 1.2^3 at exactly 1728ms.
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Every delay a fully-failing sequence would sleep, in order.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(move |attempt| self.delay_for(attempt))
    }
}

/// Builder for [`RetryPolicy`]. Starts from the defaults.
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
        }
    }
}

impl RetryPolicyBuilder {
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.policy.max_attempts = max_attempts;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.policy.initial_delay = delay;
        self
    }

    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.policy.multiplier = multiplier;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.policy.max_delay = delay;
        self
    }

    /// Replace the retryable set.
    pub fn retryable_statuses<I>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.policy.retryable_statuses = statuses.into_iter().collect();
        self
    }

    /// Add one code to the retryable set (e.g. opting plain 500 in).
    pub fn retry_status(mut self, status: u16) -> Self {
        self.policy.retryable_statuses.insert(status);
        self
    }

    pub fn retry_transport_failures(mut self, retry: bool) -> Self {
        self.policy.retry_transport_failures = retry;
        self
    }

    pub fn build(self) -> Result<RetryPolicy, PolicyError> {
        let p = self.policy;
        if p.max_attempts < 1 {
            return Err(PolicyError::ZeroAttempts);
        }
        if !p.multiplier.is_finite() || p.multiplier < 1.0 {
            return Err(PolicyError::InvalidMultiplier(p.multiplier));
        }
        if p.max_delay < p.initial_delay {
            return Err(PolicyError::DelayCeilingTooLow {
                initial_delay: p.initial_delay,
                max_delay: p.max_delay,
            });
        }
        if p.max_attempts > 1 && p.retryable_statuses.is_empty() {
            return Err(PolicyError::EmptyRetryableSet(p.max_attempts));
        }
        for &status in &p.retryable_statuses {
            if !(400..=599).contains(&status) {
                return Err(PolicyError::StatusOutOfRange(status));
            }
            if NON_TRANSIENT_STATUSES.contains(&status) {
                return Err(PolicyError::NonTransientStatus(status));
            }
        }
        Ok(p)
    }
}
