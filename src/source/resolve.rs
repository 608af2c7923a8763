use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ExtractOptions;
use crate::error::{ExtractError, FetchErrorKind, Result};
use crate::types::Origin;

use super::fetch::Fetcher;
use super::location::SuffixListLocation;

/// One step of the suffix list fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tier {
    /// Caller-supplied text
    Inline,
    /// Explicit URL or file, never cached
    Explicit(SuffixListLocation),
    /// Cached record younger than the max age
    FreshCache,
    /// Remote endpoints, written to the cache on success
    Remote,
    /// Cached record of any age
    StaleCache,
    /// Bundled snapshot
    Snapshot,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Inline => write!(f, "inline"),
            Tier::Explicit(location) => write!(f, "explicit {}", location),
            Tier::FreshCache => write!(f, "fresh cache"),
            Tier::Remote => write!(f, "remote"),
            Tier::StaleCache => write!(f, "stale cache"),
            Tier::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Ordered tiers to try for `options`; the first success wins.
///
/// `force` skips the fresh-cache shortcut so the remote tier is always tried.
pub fn plan(options: &ExtractOptions, force: bool) -> Vec<Tier> {
    let mut tiers = Vec::with_capacity(4);

    if options.suffix_list_text.is_some() {
        tiers.push(Tier::Inline);
    } else if let Some(ref location) = options.suffix_list_source {
        tiers.push(Tier::Explicit(location.clone()));
    } else {
        if !force {
            tiers.push(Tier::FreshCache);
        }
        tiers.push(Tier::Remote);
        tiers.push(Tier::StaleCache);
    }

    if options.fallback_to_snapshot {
        tiers.push(Tier::Snapshot);
    }
    tiers
}

/// Retrieves raw suffix list text from URLs and files
#[derive(Clone)]
pub struct SuffixListSource {
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
}

impl SuffixListSource {
    pub fn new(fetcher: Arc<dyn Fetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch text from an explicit location.
    pub fn fetch(&self, location: &SuffixListLocation) -> Result<(String, Origin)> {
        match location {
            SuffixListLocation::Url(url) => {
                let text = self.fetcher.fetch(url, self.timeout)?;
                Ok((text, Origin::Url(url.clone())))
            }
            SuffixListLocation::Path(path) => {
                let text = read_file(path)?;
                Ok((text, Origin::File(path.clone())))
            }
        }
    }

    /// Fetch from the first URL that answers; returns the text and that URL.
    pub fn fetch_first(&self, urls: &[String]) -> Result<(String, String)> {
        let mut last_err = None;

        for url in urls {
            tracing::debug!(source = %url, "fetching suffix list");
            match self.fetcher.fetch(url, self.timeout) {
                Ok(text) => return Ok((text, url.clone())),
                Err(e) => {
                    tracing::warn!(source = %url, error = %e, "suffix list fetch failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ExtractError::Config("no suffix list URL configured".to_string())
        }))
    }
}

fn read_file(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| {
        ExtractError::fetch(
            FetchErrorKind::NotFound,
            format!("failed to read suffix list file '{}': {}", path.display(), e),
        )
    })?;
    if text.trim().is_empty() {
        return Err(ExtractError::fetch(
            FetchErrorKind::EmptyBody,
            format!("suffix list file '{}' is empty", path.display()),
        ));
    }
    Ok(text)
}
