//! Integration test: the retrying client against a local scripted HTTP server.
//!
//! Exercises the full path: curl transport -> classifier -> backoff executor,
//! with short real delays.

mod common;

use rebound_core::cancel::CancelToken;
use rebound_core::client::RetryingClient;
use rebound_core::retry::{self, FailureDetail, RetryError, RetryPolicy, TransportFailureKind};
use rebound_core::transport::CurlTransport;
use std::time::{Duration, Instant};

fn fast_policy() -> RetryPolicy {
    RetryPolicy::builder()
        .max_attempts(5)
        .initial_delay(Duration::from_millis(10))
        .multiplier(1.2)
        .build()
        .unwrap()
}

fn client(url: &str, policy: RetryPolicy) -> RetryingClient {
    let transport = CurlTransport::new(url)
        .unwrap()
        .with_timeouts(Duration::from_secs(2), Duration::from_secs(5));
    RetryingClient::new(transport, policy)
}

#[test]
fn unavailable_then_ok_returns_body() {
    let server = common::status_server::start(&[503, 503, 200]);
    let body = client(&server.url, fast_policy())
        .get_text("hello", &CancelToken::new())
        .expect("eventually succeeds");
    assert_eq!(body, "hit 3 status 200");
    assert_eq!(server.hits(), 3);
}

#[test]
fn not_found_is_not_retried() {
    let server = common::status_server::start(&[404, 200]);
    let err = client(&server.url, fast_policy())
        .get("hello", &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, RetryError::Permanent { attempts: 1, .. }));
    assert_eq!(err.status(), Some(404));
    match err.detail() {
        Some(FailureDetail::Http(h)) => {
            assert_eq!(h.body, b"hit 1 status 404");
            assert_eq!(h.header("x-hit"), Some("1"));
        }
        other => panic!("expected HTTP detail, got {:?}", other),
    }
    assert_eq!(server.hits(), 1);
}

#[test]
fn persistent_unavailable_exhausts_attempts() {
    let server = common::status_server::start(&[503]);
    let policy = RetryPolicy::builder()
        .max_attempts(3)
        .initial_delay(Duration::from_millis(10))
        .build()
        .unwrap();
    let err = client(&server.url, policy)
        .get("hello", &CancelToken::new())
        .unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.attempts(), Some(3));
    assert_eq!(server.hits(), 3);
}

#[test]
fn request_timeout_and_too_early_are_retried() {
    let server = common::status_server::start(&[408, 425, 429, 200]);
    let body = client(&server.url, fast_policy())
        .get_text("hello", &CancelToken::new())
        .unwrap();
    assert_eq!(body, "hit 4 status 200");
    assert_eq!(server.hits(), 4);
}

#[test]
fn internal_server_error_needs_opt_in() {
    let server = common::status_server::start(&[500, 200]);
    let err = client(&server.url, fast_policy())
        .get("hello", &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, RetryError::Permanent { .. }));
    assert_eq!(err.status(), Some(500));

    let server = common::status_server::start(&[500, 200]);
    let opted_in = RetryPolicy::builder()
        .initial_delay(Duration::from_millis(10))
        .retry_status(500)
        .build()
        .unwrap();
    let body = client(&server.url, opted_in)
        .get_text("hello", &CancelToken::new())
        .unwrap();
    assert_eq!(body, "hit 2 status 200");
}

#[test]
fn connection_refused_is_retried_then_exhausted() {
    let url = common::status_server::refused_url();
    let policy = RetryPolicy::builder()
        .max_attempts(2)
        .initial_delay(Duration::from_millis(10))
        .build()
        .unwrap();
    let err = client(&url, policy).get("hello", &CancelToken::new()).unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), Some(2));
    match err.detail() {
        Some(FailureDetail::Transport(t)) => assert_eq!(t.kind, TransportFailureKind::Connect),
        other => panic!("expected transport detail, got {:?}", other),
    }
}

#[test]
fn connection_refused_is_permanent_when_transport_retries_disabled() {
    let url = common::status_server::refused_url();
    let policy = RetryPolicy::builder()
        .retry_transport_failures(false)
        .build()
        .unwrap();
    let start = Instant::now();
    let err = client(&url, policy).get("hello", &CancelToken::new()).unwrap_err();
    assert!(matches!(err, RetryError::Permanent { attempts: 1, .. }));
    assert_eq!(err.status(), None);
    // Default policy would have slept a full second before a second attempt.
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn deadline_cancels_between_attempts() {
    let server = common::status_server::start(&[503]);
    let policy = RetryPolicy::builder()
        .initial_delay(Duration::from_secs(20))
        .build()
        .unwrap();
    let cancel = CancelToken::with_timeout(Duration::from_millis(300));
    let start = Instant::now();
    let err = client(&server.url, policy).get("hello", &cancel).unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.attempts(), Some(1));
    assert_eq!(server.hits(), 1);
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn async_executor_drives_blocking_transport() {
    let server = common::status_server::start(&[502, 200]);
    let transport = CurlTransport::new(&server.url).unwrap();
    let policy = fast_policy();
    let body = retry::execute_async(&policy, &CancelToken::new(), || {
        let transport = transport.clone();
        async move {
            tokio::task::spawn_blocking(move || transport.get("hello"))
                .await
                .map_err(anyhow::Error::from)?
        }
    })
    .await
    .unwrap();
    assert_eq!(body, b"hit 2 status 200");
    assert_eq!(server.hits(), 2);
}
