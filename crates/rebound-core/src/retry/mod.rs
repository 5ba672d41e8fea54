//! Retry decision engine.
//!
//! The classifier turns one attempt's result into a verdict keyed on the exact
//! HTTP status code; the executors drive a bounded sequence of attempts with
//! geometric backoff, stopping on success, a permanent failure, exhaustion or
//! cancellation.

mod classify;
mod error;
mod policy;
mod run;
mod run_async;
mod session;

pub use classify::{classify, classify_status, AttemptResult, StatusClass, Verdict};
pub use error::{
    FailureDetail, HttpFailure, PolicyError, RetryError, TransportFailure, TransportFailureKind,
};
pub use policy::{RetryPolicy, RetryPolicyBuilder, DEFAULT_RETRYABLE_STATUSES};
pub use run::{execute, execute_with, Sleeper, ThreadSleeper};
pub use run_async::execute_async;
pub use session::{RetrySession, Step};
