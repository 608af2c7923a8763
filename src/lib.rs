//! PSL Extract - split hostnames and URLs using the Public Suffix List
//!
//! This library separates a host into subdomain, registrable domain and
//! public suffix, correctly handling multi-level suffixes such as `co.uk`
//! or `github.io` where "last two labels" heuristics fail:
//! - Longest-match rule lookup with wildcard and exception rules
//! - ICANN and PRIVATE section awareness, selectable per call
//! - Suffix list download with an on-disk cache and staleness window
//! - Fallback to a stale cache, then to a bundled snapshot
//! - IDNA-aware matching of punycode and Unicode labels
//!
//! # Example
//!
//! ```rust
//! use psl_extract::Extractor;
//!
//! // Bundled snapshot: no network, no cache
//! let extractor = Extractor::snapshot().unwrap();
//!
//! let result = extractor.extract("http://forums.bbc.co.uk/news");
//! assert_eq!(result.subdomain, vec!["forums"]);
//! assert_eq!(result.domain, "bbc");
//! assert_eq!(result.suffix, vec!["co", "uk"]);
//! assert_eq!(result.registered_domain(), "bbc.co.uk");
//!
//! // Private suffixes are opt-in
//! let result = extractor.extract_with("project.github.io", true);
//! assert_eq!(result.registered_domain(), "project.github.io");
//! assert!(result.is_private);
//! ```
//!
//! # Suffix list sources
//!
//! [`Extractor::new`] resolves the list through these tiers, first success
//! wins:
//!
//! | Tier          | Configured with                         | Cached |
//! |---------------|-----------------------------------------|--------|
//! | Inline text   | `with_suffix_list_text`                 | no     |
//! | Explicit      | `with_suffix_list_source` (URL or path) | no     |
//! | Fresh cache   | `with_cache_max_age`                    | -      |
//! | Remote        | `with_suffix_list_urls`                 | yes    |
//! | Stale cache   | -                                       | -      |
//! | Snapshot      | `with_fallback_to_snapshot`             | no     |
//!
//! The cache, remote and stale tiers apply only when neither inline text nor
//! an explicit source is configured.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use psl_extract::{ExtractOptions, Extractor};
//!
//! let options = ExtractOptions::new()
//!     .with_cache_dir("/var/cache/psl")
//!     .with_cache_max_age(Duration::from_secs(24 * 60 * 60))
//!     .with_fetch_timeout(Duration::from_secs(5));
//! let extractor = Extractor::new(options).unwrap();
//!
//! // Later: refresh in place, readers are never blocked
//! let status = extractor.update(true).unwrap();
//! println!("{}", status);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod parser;
pub mod ruleset;
pub mod source;
pub mod types;

// Re-export commonly used items
pub use cache::{CacheKey, CacheManager, CacheRecord, CacheStorage, FsStorage, MemoryStorage};
pub use config::{
    default_cache_dir, ExtractOptions, DEFAULT_CACHE_MAX_AGE, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_MEMO_CAPACITY,
};
pub use error::{ExtractError, FetchErrorKind, Result};
pub use extract::{normalize_label, split_host, Extractor, Host, LabelForm};
pub use matcher::{MatchKind, SuffixMatch, SuffixTrie};
pub use parser::{fingerprint, parse_rules, ParsedRules};
pub use ruleset::RuleSet;
pub use source::{
    snapshot_rule_set, Fetcher, HttpFetcher, MemoryFetcher, NilFetcher, SuffixListLocation,
    DEFAULT_SUFFIX_LIST_URLS,
};
pub use types::{CacheStatus, ExtractResult, Origin, Rule, RuleKind};
