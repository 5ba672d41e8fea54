//! Async retry loop for tokio callers. Backoff suspends only the calling task.

use std::future::Future;

use super::classify::{classify, AttemptResult};
use super::error::RetryError;
use super::policy::RetryPolicy;
use super::session::{RetrySession, Step};
use crate::cancel::CancelToken;

/// Async counterpart of [`execute`](super::execute). `operation` builds a fresh
/// future per attempt.
pub async fn execute_async<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut operation: F,
) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<AttemptResult<T>>>,
{
    let mut session = RetrySession::new(policy);
    loop {
        if cancel.is_cancelled() {
            return Err(session.cancelled());
        }
        tracing::debug!("attempt {}/{}", session.attempt(), policy.max_attempts());
        let result = operation().await.map_err(RetryError::Operation)?;
        match session.observe(classify(result, policy)) {
            Step::Finish(outcome) => return outcome,
            Step::Backoff(delay) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(session.cancelled()),
                    _ = tokio::time::sleep(delay) => session.advance(delay),
                }
            }
        }
    }
}
