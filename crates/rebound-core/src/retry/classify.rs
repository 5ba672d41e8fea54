//! Classify one attempt's result into a retry verdict.
//!
//! Classification keys on the exact status code and the policy's allow-list.
//! There is no "all 5xx" or "all 4xx" bucket: 429 and 401 are both
//! client errors but only one of them can succeed on retry.

use super::error::{FailureDetail, HttpFailure, TransportFailure};
use super::policy::RetryPolicy;

/// Outcome of a single attempt, as produced by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult<T> {
    /// A response with a 2xx/3xx status and its decoded payload.
    Success { status: u16, value: T },
    /// A response with an error status.
    HttpError(HttpFailure),
    /// No response was received.
    Transport(TransportFailure),
}

impl AttemptResult<Vec<u8>> {
    /// Route a raw response into the success or error variant by status.
    pub fn from_response(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        if (200..=399).contains(&status) {
            AttemptResult::Success {
                status,
                value: body,
            }
        } else {
            AttemptResult::HttpError(HttpFailure {
                status,
                headers,
                body,
            })
        }
    }
}

impl<T> AttemptResult<T> {
    /// Transform the success payload, leaving failures untouched.
    pub fn map<U, F>(self, f: F) -> AttemptResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            AttemptResult::Success { status, value } => AttemptResult::Success {
                status,
                value: f(value),
            },
            AttemptResult::HttpError(h) => AttemptResult::HttpError(h),
            AttemptResult::Transport(t) => AttemptResult::Transport(t),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AttemptResult::Success { status, .. } => Some(*status),
            AttemptResult::HttpError(h) => Some(h.status),
            AttemptResult::Transport(_) => None,
        }
    }
}

/// What the executor should do with an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<T> {
    Success(T),
    Retryable(FailureDetail),
    Permanent(FailureDetail),
}

impl<T> Verdict<T> {
    pub fn class(&self) -> StatusClass {
        match self {
            Verdict::Success(_) => StatusClass::Success,
            Verdict::Retryable(_) => StatusClass::Retryable,
            Verdict::Permanent(_) => StatusClass::Permanent,
        }
    }
}

/// Payload-free verdict, usable for eager checks on a bare status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Retryable,
    Permanent,
}

/// Classify a bare status code under `policy`.
///
/// Anything outside 200..=599 is permanent: never retry the unknown.
pub fn classify_status(status: u16, policy: &RetryPolicy) -> StatusClass {
    match status {
        200..=399 => StatusClass::Success,
        400..=599 if policy.is_retryable_status(status) => StatusClass::Retryable,
        _ => StatusClass::Permanent,
    }
}

/// Classify an attempt result under `policy`. Pure and deterministic.
pub fn classify<T>(result: AttemptResult<T>, policy: &RetryPolicy) -> Verdict<T> {
    match result {
        AttemptResult::Success { status, value } => match classify_status(status, policy) {
            StatusClass::Success => Verdict::Success(value),
            // A success-shaped result carrying an error code is judged by the code.
            StatusClass::Retryable => Verdict::Retryable(HttpFailure::new(status).into()),
            StatusClass::Permanent => Verdict::Permanent(HttpFailure::new(status).into()),
        },
        AttemptResult::HttpError(failure) => match classify_status(failure.status, policy) {
            StatusClass::Retryable => Verdict::Retryable(failure.into()),
            StatusClass::Success | StatusClass::Permanent => Verdict::Permanent(failure.into()),
        },
        AttemptResult::Transport(failure) => {
            if policy.retry_transport_failures() {
                Verdict::Retryable(failure.into())
            } else {
                Verdict::Permanent(failure.into())
            }
        }
    }
}
