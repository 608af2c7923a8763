//! Extraction and suffix list acquisition options.
//!
//! Options are built with chained `with_*` calls on top of the defaults and
//! may be overridden from the environment:
//!
//! | Variable                    | Effect                                      |
//! |-----------------------------|---------------------------------------------|
//! | `PSL_EXTRACT_CACHE_DIR`     | cache directory; `none` disables disk cache |
//! | `PSL_EXTRACT_FETCH_TIMEOUT` | fetch timeout in seconds (fractional ok)    |
//! | `PSL_EXTRACT_CACHE_MAX_AGE` | cache staleness threshold in seconds        |

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ExtractError, Result};
use crate::source::{SuffixListLocation, DEFAULT_SUFFIX_LIST_URLS};

/// Default staleness threshold: 7 days
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default fetch timeout
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default capacity of the extraction memo
pub const DEFAULT_MEMO_CAPACITY: usize = 1024;

pub const CACHE_DIR_ENV: &str = "PSL_EXTRACT_CACHE_DIR";
pub const FETCH_TIMEOUT_ENV: &str = "PSL_EXTRACT_FETCH_TIMEOUT";
pub const CACHE_MAX_AGE_ENV: &str = "PSL_EXTRACT_CACHE_MAX_AGE";

/// Directory name used under the user cache directory
const CACHE_DIR_NAME: &str = "psl-extract";

/// Options for [`Extractor`](crate::Extractor) and
/// [`CacheManager`](crate::CacheManager)
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Honor rules from the PRIVATE DOMAINS section
    pub include_private_domains: bool,
    /// Remote endpoints for the cached tier, tried in order
    pub suffix_list_urls: Vec<String>,
    /// Pin the cache record to this file
    pub cache_file_path: Option<PathBuf>,
    /// Cache directory; defaults to the user cache directory
    pub cache_dir: Option<PathBuf>,
    /// `false` keeps the cache in memory only
    pub cache_enabled: bool,
    pub cache_max_age: Duration,
    pub fetch_timeout: Duration,
    /// Skip the freshness check on initialization
    pub force_refresh: bool,
    /// Use the bundled snapshot when every other tier fails
    pub fallback_to_snapshot: bool,
    /// In-memory rule text; used as-is and never cached
    pub suffix_list_text: Option<String>,
    /// Explicit URL or file, fetched fresh every time and never cached
    pub suffix_list_source: Option<SuffixListLocation>,
    /// Additional ICANN suffixes, e.g. internal zones
    pub extra_suffixes: Vec<String>,
    /// LRU memo size; 0 disables memoization
    pub memo_capacity: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_private_domains: false,
            suffix_list_urls: DEFAULT_SUFFIX_LIST_URLS
                .iter()
                .map(|url| url.to_string())
                .collect(),
            cache_file_path: None,
            cache_dir: None,
            cache_enabled: true,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            force_refresh: false,
            fallback_to_snapshot: true,
            suffix_list_text: None,
            suffix_list_source: None,
            extra_suffixes: Vec::new(),
            memo_capacity: DEFAULT_MEMO_CAPACITY,
        }
    }
}

impl ExtractOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_env()
    }

    /// Apply `PSL_EXTRACT_*` environment overrides.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(mut self, get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dir) = get(CACHE_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            if dir.trim().eq_ignore_ascii_case("none") {
                self.cache_enabled = false;
            } else {
                self.cache_dir = Some(PathBuf::from(dir.trim()));
            }
        }
        if let Some(value) = get(FETCH_TIMEOUT_ENV) {
            self.fetch_timeout = parse_seconds(FETCH_TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = get(CACHE_MAX_AGE_ENV) {
            self.cache_max_age = parse_seconds(CACHE_MAX_AGE_ENV, &value)?;
        }
        Ok(self)
    }

    pub fn with_private_domains(mut self, include: bool) -> Self {
        self.include_private_domains = include;
        self
    }

    /// Replace the remote endpoint list with a single URL
    pub fn with_cache_source_url(mut self, url: impl Into<String>) -> Self {
        self.suffix_list_urls = vec![url.into()];
        self
    }

    pub fn with_suffix_list_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffix_list_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cache_file_path(mut self, path: impl AsRef<Path>) -> Self {
        self.cache_file_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Keep fetched lists in memory only
    pub fn without_disk_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    /// Set staleness threshold for cached lists
    /// Default is 7 days (DEFAULT_CACHE_MAX_AGE)
    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache_max_age = max_age;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    pub fn with_fallback_to_snapshot(mut self, fallback: bool) -> Self {
        self.fallback_to_snapshot = fallback;
        self
    }

    pub fn with_suffix_list_text(mut self, text: impl Into<String>) -> Self {
        self.suffix_list_text = Some(text.into());
        self
    }

    /// Explicit URL or file path; see [`SuffixListLocation::detect`]
    pub fn with_suffix_list_source(mut self, location: impl AsRef<str>) -> Self {
        self.suffix_list_source = Some(SuffixListLocation::detect(location.as_ref()));
        self
    }

    pub fn with_extra_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_memo_capacity(mut self, capacity: usize) -> Self {
        self.memo_capacity = capacity;
        self
    }

    /// Reject option combinations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout.is_zero() {
            return Err(ExtractError::Config(
                "fetch timeout must be greater than zero".to_string(),
            ));
        }
        let uses_remote = self.suffix_list_text.is_none() && self.suffix_list_source.is_none();
        if uses_remote && self.suffix_list_urls.is_empty() && !self.fallback_to_snapshot {
            return Err(ExtractError::Config(
                "no suffix list URL configured and snapshot fallback disabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory holding cache records.
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }
}

/// `$XDG_CACHE_HOME/psl-extract`, `$HOME/.cache/psl-extract`, or a temp dir.
pub fn default_cache_dir() -> PathBuf {
    let non_empty = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty());

    if let Some(xdg) = non_empty("XDG_CACHE_HOME") {
        return PathBuf::from(xdg).join(CACHE_DIR_NAME);
    }
    if let Some(home) = non_empty("HOME") {
        return PathBuf::from(home).join(".cache").join(CACHE_DIR_NAME);
    }
    std::env::temp_dir().join(CACHE_DIR_NAME)
}

fn parse_seconds(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| ExtractError::Config(format!("invalid {}: {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert!(!options.include_private_domains);
        assert_eq!(options.suffix_list_urls.len(), 2);
        assert_eq!(options.cache_max_age, DEFAULT_CACHE_MAX_AGE);
        assert_eq!(options.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
        assert!(options.cache_enabled);
        assert!(options.fallback_to_snapshot);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let options = ExtractOptions::new()
            .with_private_domains(true)
            .with_cache_source_url("https://example.com/list.dat")
            .with_cache_dir("/tmp/psl-test")
            .with_cache_max_age(Duration::from_secs(60))
            .with_fetch_timeout(Duration::from_secs(2))
            .with_extra_suffixes(["internal"])
            .with_suffix_list_source("/tmp/list.dat");

        assert!(options.include_private_domains);
        assert_eq!(options.suffix_list_urls, vec!["https://example.com/list.dat"]);
        assert_eq!(options.resolved_cache_dir(), PathBuf::from("/tmp/psl-test"));
        assert_eq!(options.cache_max_age, Duration::from_secs(60));
        assert_eq!(options.extra_suffixes, vec!["internal"]);
        assert_eq!(
            options.suffix_list_source,
            Some(SuffixListLocation::Path(PathBuf::from("/tmp/list.dat")))
        );
    }

    #[test]
    fn test_env_overrides() {
        let options = ExtractOptions::default()
            .apply_vars(vars(&[
                (CACHE_DIR_ENV, "/var/cache/psl"),
                (FETCH_TIMEOUT_ENV, "2.5"),
                (CACHE_MAX_AGE_ENV, "3600"),
            ]))
            .unwrap();
        assert_eq!(options.cache_dir, Some(PathBuf::from("/var/cache/psl")));
        assert_eq!(options.fetch_timeout, Duration::from_millis(2500));
        assert_eq!(options.cache_max_age, Duration::from_secs(3600));
    }

    #[test]
    fn test_env_none_disables_disk_cache() {
        let options = ExtractOptions::default()
            .apply_vars(vars(&[(CACHE_DIR_ENV, "NONE")]))
            .unwrap();
        assert!(!options.cache_enabled);
        assert!(options.cache_dir.is_none());
    }

    #[test]
    fn test_env_invalid_value_is_config_error() {
        let result =
            ExtractOptions::default().apply_vars(vars(&[(FETCH_TIMEOUT_ENV, "soon")]));
        assert!(matches!(result, Err(ExtractError::Config(_))));

        let result = ExtractOptions::default().apply_vars(vars(&[(CACHE_MAX_AGE_ENV, "-1")]));
        assert!(matches!(result, Err(ExtractError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let options = ExtractOptions::default().with_fetch_timeout(Duration::ZERO);
        assert!(matches!(options.validate(), Err(ExtractError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_no_source_at_all() {
        let options = ExtractOptions::default()
            .with_suffix_list_urls(Vec::<String>::new())
            .with_fallback_to_snapshot(false);
        assert!(options.validate().is_err());

        let options = options.with_suffix_list_text("com\n");
        assert!(options.validate().is_ok());
    }
}
