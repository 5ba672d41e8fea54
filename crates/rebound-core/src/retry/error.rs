//! Failure details carried by verdicts, and the errors surfaced by the executors
//! and by policy construction.

use std::fmt;
use std::time::Duration;

/// Coarse kind of a transport failure. Diagnostic only: the classifier treats
/// every transport failure the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailureKind {
    /// Connect or overall timeout fired before a response arrived.
    Timeout,
    /// Connection refused or reset while connecting.
    Connect,
    /// Host or proxy name could not be resolved.
    Resolve,
    /// Send/receive failed mid-exchange, or the server sent nothing.
    Io,
    /// Anything else the transport reported.
    Other,
}

impl fmt::Display for TransportFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportFailureKind::Timeout => "timeout",
            TransportFailureKind::Connect => "connect",
            TransportFailureKind::Resolve => "resolve",
            TransportFailureKind::Io => "io",
            TransportFailureKind::Other => "transport",
        };
        f.write_str(s)
    }
}

/// No response was received for an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: TransportFailureKind,
    /// Human-readable cause as reported by the transport.
    pub cause: String,
}

impl TransportFailure {
    pub fn new(kind: TransportFailureKind, cause: impl Into<String>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.cause)
    }
}

/// An HTTP response with a failing status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    /// Exact status code as sent by the server.
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpFailure {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// First header value matching `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)
    }
}

/// What went wrong in a failed attempt: an error status or a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureDetail {
    Http(HttpFailure),
    Transport(TransportFailure),
}

impl FailureDetail {
    /// Status code, if the attempt got a response at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FailureDetail::Http(h) => Some(h.status),
            FailureDetail::Transport(_) => None,
        }
    }

    pub fn transport(&self) -> Option<&TransportFailure> {
        match self {
            FailureDetail::Http(_) => None,
            FailureDetail::Transport(t) => Some(t),
        }
    }
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureDetail::Http(h) => write!(f, "{}", h),
            FailureDetail::Transport(t) => write!(f, "{}", t),
        }
    }
}

impl From<HttpFailure> for FailureDetail {
    fn from(h: HttpFailure) -> Self {
        FailureDetail::Http(h)
    }
}

impl From<TransportFailure> for FailureDetail {
    fn from(t: TransportFailure) -> Self {
        FailureDetail::Transport(t)
    }
}

/// Final failure of a retry sequence.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// The last attempt failed in a way retrying cannot fix.
    #[error("permanent failure on attempt {attempts}: {detail}")]
    Permanent { detail: FailureDetail, attempts: u32 },

    /// Every allowed attempt failed transiently; `detail` is the last one.
    #[error("gave up after {attempts} attempts ({total_delay:?} backing off): {detail}")]
    Exhausted {
        detail: FailureDetail,
        attempts: u32,
        total_delay: Duration,
    },

    /// Cancellation or deadline fired before the sequence finished.
    #[error("cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },

    /// The operation itself failed outside the attempt model (bad URL,
    /// misconfigured transport). Never retried.
    #[error(transparent)]
    Operation(anyhow::Error),
}

impl RetryError {
    /// Detail of the attempt that ended the sequence, if any.
    pub fn detail(&self) -> Option<&FailureDetail> {
        match self {
            RetryError::Permanent { detail, .. } | RetryError::Exhausted { detail, .. } => {
                Some(detail)
            }
            RetryError::Cancelled { .. } | RetryError::Operation(_) => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.detail().and_then(FailureDetail::status)
    }

    /// Number of attempts that were performed.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            RetryError::Permanent { attempts, .. }
            | RetryError::Exhausted { attempts, .. }
            | RetryError::Cancelled { attempts } => Some(*attempts),
            RetryError::Operation(_) => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

/// Invalid retry policy, rejected at construction time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("multiplier must be a finite number >= 1.0, got {0}")]
    InvalidMultiplier(f64),

    #[error("max_delay {max_delay:?} is shorter than initial_delay {initial_delay:?}")]
    DelayCeilingTooLow {
        initial_delay: Duration,
        max_delay: Duration,
    },

    #[error("no retryable status codes configured but max_attempts is {0}")]
    EmptyRetryableSet(u32),

    #[error("status {0} is not an HTTP error code (expected 400..=599)")]
    StatusOutOfRange(u16),

    #[error("status {0} is not transient; retrying it cannot succeed")]
    NonTransientStatus(u16),
}
