//! HTTP transport: one GET per call via libcurl, no retries of its own.
//!
//! Reports the exact status code of every response it receives and maps curl
//! failures (nothing received) to [`TransportFailure`]s, so the retry layer can
//! classify without depending on per-status error types.

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;
use url::Url;

use crate::config::ReboundConfig;
use crate::retry::{AttemptResult, TransportFailure, TransportFailureKind};

/// Blocking HTTP client bound to a base URL.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    base_url: Url,
    connect_timeout: Duration,
    timeout: Duration,
    headers: Vec<(String, String)>,
}

impl CurlTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid base URL {:?}", base_url))?;
        Ok(Self {
            base_url,
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
            headers: Vec::new(),
        })
    }

    pub fn from_config(cfg: &ReboundConfig) -> Result<Self> {
        Ok(Self::new(&cfg.base_url)?.with_timeouts(
            Duration::from_secs(cfg.connect_timeout_secs),
            Duration::from_secs(cfg.timeout_secs),
        ))
    }

    pub fn with_timeouts(mut self, connect: Duration, total: Duration) -> Self {
        self.connect_timeout = connect;
        self.timeout = total;
        self
    }

    /// Add a request header sent on every call.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` (relative or absolute) against the base URL.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("cannot resolve {:?} against {}", path, self.base_url))
    }

    /// Performs one GET. Follows redirects.
    ///
    /// `Ok` carries either a response (any status) or a transport failure; `Err`
    /// means the request could not even be set up.
    /// Runs in the current thread; call from `spawn_blocking` if used from async code.
    pub fn get(&self, path: &str) -> Result<AttemptResult<Vec<u8>>> {
        let url = self.resolve(path)?;
        let mut body: Vec<u8> = Vec::new();
        let mut header_lines: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str()).context("invalid URL")?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        if !self.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in &self.headers {
                list.append(&format!("{}: {}", k.trim(), v.trim()))?;
            }
            easy.http_headers(list)?;
        }

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line starts a new response (redirect hop).
                    if line.starts_with("HTTP/") {
                        header_lines.clear();
                    }
                    header_lines.push(line.to_string());
                }
                true
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            tracing::debug!("GET {} failed: {}", url, e);
            return Ok(AttemptResult::Transport(transport_failure(&e)));
        }

        let code = easy.response_code().context("no response code")?;
        if code == 0 {
            return Ok(AttemptResult::Transport(TransportFailure::new(
                TransportFailureKind::Other,
                "no status line received",
            )));
        }
        let status = u16::try_from(code).with_context(|| format!("bad status code {}", code))?;
        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(AttemptResult::from_response(
            status,
            parse_headers(&header_lines),
            body,
        ))
    }
}

/// Map a curl error onto a transport failure kind.
pub fn transport_failure(e: &curl::Error) -> TransportFailure {
    let kind = if e.is_operation_timedout() {
        TransportFailureKind::Timeout
    } else if e.is_couldnt_connect() {
        TransportFailureKind::Connect
    } else if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        TransportFailureKind::Resolve
    } else if e.is_read_error() || e.is_recv_error() || e.is_send_error() || e.is_got_nothing() {
        TransportFailureKind::Io
    } else {
        TransportFailureKind::Other
    };
    TransportFailure::new(kind, e.description())
}

/// Split raw header lines into name/value pairs, skipping the status line.
fn parse_headers(lines: &[String]) -> Vec<(String, String)> {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with("HTTP/"))
        .filter_map(|l| l.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}
