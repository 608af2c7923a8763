use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{ExtractError, FetchErrorKind, Result};

/// Trait for retrieving suffix list text from a URL
pub trait Fetcher: Send + Sync {
    /// Fetch the body at `url`, giving up after `timeout`.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// HTTP fetcher backed by `ureq`
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        let agent = ureq::Agent::new_with_config(config);

        let mut response = agent.get(url).call().map_err(|e| map_ureq_error(url, e))?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| map_ureq_error(url, e))?;

        if body.trim().is_empty() {
            return Err(ExtractError::fetch(
                FetchErrorKind::EmptyBody,
                format!("{} returned an empty body", url),
            ));
        }
        Ok(body)
    }
}

fn map_ureq_error(url: &str, err: ureq::Error) -> ExtractError {
    let kind = match err {
        ureq::Error::StatusCode(_) => FetchErrorKind::Status,
        ureq::Error::Timeout(_) => FetchErrorKind::Timeout,
        _ => FetchErrorKind::Transport,
    };
    ExtractError::fetch(kind, format!("download of {} failed: {}", url, err))
}

/// Fetcher that always fails, for offline use
#[derive(Debug, Clone, Default)]
pub struct NilFetcher;

impl Fetcher for NilFetcher {
    fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
        Err(ExtractError::fetch(
            FetchErrorKind::Transport,
            format!("network disabled (requested: {})", url),
        ))
    }
}

/// In-memory fetcher for testing
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    bodies: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    /// Number of fetches attempted so far
    pub fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.bodies.get(url) {
            Some(body) if body.trim().is_empty() => Err(ExtractError::fetch(
                FetchErrorKind::EmptyBody,
                format!("{} returned an empty body", url),
            )),
            Some(body) => Ok(body.clone()),
            None => Err(ExtractError::fetch(
                FetchErrorKind::Status,
                format!("download of {} failed: http status: 404", url),
            )),
        }
    }
}
