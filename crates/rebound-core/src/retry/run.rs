//! Blocking retry loop: run an operation until it succeeds or the policy says stop.

use std::time::Duration;

use super::classify::{classify, AttemptResult};
use super::error::RetryError;
use super::policy::RetryPolicy;
use super::session::{RetrySession, Step};
use crate::cancel::CancelToken;

/// Performs the backoff sleep between attempts.
pub trait Sleeper {
    /// Sleep for `delay` unless `cancel` fires first. Returns `false` if interrupted.
    fn sleep(&mut self, delay: Duration, cancel: &CancelToken) -> bool;
}

/// Sleeps on the calling thread, waking early on cancellation.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration, cancel: &CancelToken) -> bool {
        !cancel.wait_timeout(delay)
    }
}

/// Runs `operation` under `policy`, blocking the current thread while backing off.
///
/// `operation` performs exactly one attempt per call and is re-invoked in full on
/// every retry. An `Err` from it is a defect outside the attempt model and is
/// returned immediately as [`RetryError::Operation`].
pub fn execute<T, F>(policy: &RetryPolicy, cancel: &CancelToken, operation: F) -> Result<T, RetryError>
where
    F: FnMut() -> anyhow::Result<AttemptResult<T>>,
{
    execute_with(policy, cancel, &mut ThreadSleeper, operation)
}

/// Like [`execute`] but with a caller-supplied [`Sleeper`].
pub fn execute_with<T, F, S>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    sleeper: &mut S,
    mut operation: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> anyhow::Result<AttemptResult<T>>,
    S: Sleeper + ?Sized,
{
    let mut session = RetrySession::new(policy);
    loop {
        if cancel.is_cancelled() {
            return Err(session.cancelled());
        }
        tracing::debug!("attempt {}/{}", session.attempt(), policy.max_attempts());
        let result = operation().map_err(RetryError::Operation)?;
        match session.observe(classify(result, policy)) {
            Step::Finish(outcome) => return outcome,
            Step::Backoff(delay) => {
                if !sleeper.sleep(delay, cancel) {
                    return Err(session.cancelled());
                }
                session.advance(delay);
            }
        }
    }
}
