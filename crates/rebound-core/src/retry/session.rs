//! Per-call retry bookkeeping shared by the blocking and async executors.

use std::time::Duration;

use super::classify::{StatusClass, Verdict};
use super::error::RetryError;
use super::policy::RetryPolicy;

/// Next action after observing a verdict.
#[derive(Debug)]
pub enum Step<T> {
    /// The sequence is over.
    Finish(Result<T, RetryError>),
    /// Sleep for the given delay, then call [`RetrySession::advance`] and retry.
    Backoff(Duration),
}

/// State of one retry sequence: created per call, dropped when it finishes.
#[derive(Debug)]
pub struct RetrySession<'a> {
    policy: &'a RetryPolicy,
    attempt: u32,
    completed: u32,
    total_delay: Duration,
    last: Option<StatusClass>,
}

impl<'a> RetrySession<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self {
            policy,
            attempt: 1,
            completed: 0,
            total_delay: Duration::ZERO,
            last: None,
        }
    }

    /// 1-based number of the current attempt.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Attempts whose result has been observed.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Time spent backing off so far.
    pub fn total_delay(&self) -> Duration {
        self.total_delay
    }

    pub fn last_verdict(&self) -> Option<StatusClass> {
        self.last
    }

    /// Record the verdict of the current attempt and decide what happens next.
    pub fn observe<T>(&mut self, verdict: Verdict<T>) -> Step<T> {
        self.completed = self.attempt;
        self.last = Some(verdict.class());
        match verdict {
            Verdict::Success(value) => {
                if self.attempt > 1 {
                    tracing::info!("attempt {} succeeded after retries", self.attempt);
                }
                Step::Finish(Ok(value))
            }
            Verdict::Permanent(detail) => {
                tracing::debug!("attempt {} failed permanently: {}", self.attempt, detail);
                Step::Finish(Err(RetryError::Permanent {
                    detail,
                    attempts: self.attempt,
                }))
            }
            Verdict::Retryable(detail) => {
                if self.attempt >= self.policy.max_attempts() {
                    tracing::info!(
                        "giving up after {} attempts: {}",
                        self.attempt,
                        detail
                    );
                    return Step::Finish(Err(RetryError::Exhausted {
                        detail,
                        attempts: self.attempt,
                        total_delay: self.total_delay,
                    }));
                }
                let delay = self.policy.delay_for(self.attempt);
                tracing::warn!(
                    "attempt {}/{} failed ({}), retrying in {:?}",
                    self.attempt,
                    self.policy.max_attempts(),
                    detail,
                    delay
                );
                Step::Backoff(delay)
            }
        }
    }

    /// Move to the next attempt after sleeping `slept`.
    pub fn advance(&mut self, slept: Duration) {
        self.total_delay = self.total_delay.saturating_add(slept);
        self.attempt += 1;
    }

    /// Error to return when cancellation stops the sequence.
    pub fn cancelled(&self) -> RetryError {
        tracing::info!("retry sequence cancelled after {} attempt(s)", self.completed);
        RetryError::Cancelled {
            attempts: self.completed,
        }
    }
}
