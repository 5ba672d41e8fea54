//! Retrying HTTP client: the transport driven through the backoff executor.

use anyhow::Result;

use crate::cancel::CancelToken;
use crate::config::ReboundConfig;
use crate::retry::{self, RetryError, RetryPolicy};
use crate::transport::CurlTransport;

/// A [`CurlTransport`] paired with the policy every call is retried under.
#[derive(Debug, Clone)]
pub struct RetryingClient {
    transport: CurlTransport,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(transport: CurlTransport, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Build transport and policy from config; an invalid `[retry]` section fails here.
    pub fn from_config(cfg: &ReboundConfig) -> Result<Self> {
        let transport = CurlTransport::from_config(cfg)?;
        let policy = cfg.retry_policy()?;
        Ok(Self::new(transport, policy))
    }

    pub fn transport(&self) -> &CurlTransport {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `path`, retrying transient failures. Blocks the current thread.
    pub fn get(&self, path: &str, cancel: &CancelToken) -> Result<Vec<u8>, RetryError> {
        tracing::debug!("GET {} with up to {} attempts", path, self.policy.max_attempts());
        retry::execute(&self.policy, cancel, || self.transport.get(path))
    }

    /// Like [`get`](Self::get), decoding the body as UTF-8 (lossily).
    pub fn get_text(&self, path: &str, cancel: &CancelToken) -> Result<String, RetryError> {
        retry::execute(&self.policy, cancel, || {
            Ok(self
                .transport
                .get(path)?
                .map(|body| String::from_utf8_lossy(&body).into_owned()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_rejects_invalid_policy() {
        let mut cfg = ReboundConfig::default();
        let mut retry = cfg.retry_config();
        retry.max_attempts = 0;
        cfg.retry = Some(retry);
        let err = RetryingClient::from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("max_attempts"), "{err}");
    }

    #[test]
    fn from_config_uses_default_policy() {
        let client = RetryingClient::from_config(&ReboundConfig::default()).unwrap();
        assert_eq!(client.policy(), &RetryPolicy::default());
        assert_eq!(client.transport().base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn cancelled_token_skips_the_request() {
        let client = RetryingClient::from_config(&ReboundConfig::default()).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = client.get("/hello", &cancel).unwrap_err();
        assert!(matches!(err, RetryError::Cancelled { attempts: 0 }));
    }
}
