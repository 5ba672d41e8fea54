//! Cancellation for in-flight retry sequences.
//!
//! A `CancelToken` is shared between the code running a retry sequence and
//! whoever may want to stop it (a Ctrl-C handler, a request deadline). The
//! executors check it before every attempt and race it against every backoff
//! sleep, both on blocking threads and inside tokio tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    lock: Mutex<()>,
    cond: Condvar,
    notify: Notify,
}

/// Cloneable cancellation signal with an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that cancels itself once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                deadline: Instant::now().checked_add(timeout),
                ..Inner::default()
            }),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Request cancellation; wakes every blocked and awaiting waiter.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        // Taking the lock orders this wakeup after any waiter's flag check.
        drop(self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner));
        self.inner.cond.notify_all();
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
            || self
                .inner
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Block the current thread for up to `timeout`.
    ///
    /// Returns `true` if the token was (or became) cancelled, `false` if the
    /// full timeout elapsed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let end = Instant::now().checked_add(timeout);
        let limit = match (end, self.inner.deadline) {
            (Some(end), Some(deadline)) => Some(end.min(deadline)),
            (end, deadline) => end.or(deadline),
        };

        let mut guard = self
            .inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        loop {
            if self.is_cancelled() {
                return true;
            }
            match limit {
                Some(limit) => {
                    let now = Instant::now();
                    if now >= limit {
                        return self.is_cancelled();
                    }
                    guard = self
                        .inner
                        .cond
                        .wait_timeout(guard, limit - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
                None => {
                    guard = self
                        .inner
                        .cond
                        .wait(guard)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    /// Completes once the token is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        if self.is_cancelled() {
            return;
        }
        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = notified => {}
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {}
                }
            }
            None => notified.await,
        }
    }
}
