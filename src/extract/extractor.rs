use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};

use crate::cache::CacheManager;
use crate::config::ExtractOptions;
use crate::error::{ExtractError, Result};
use crate::matcher::SuffixTrie;
use crate::ruleset::RuleSet;
use crate::source::snapshot_rule_set;
use crate::types::{CacheStatus, ExtractResult};

use super::host::{split_host, Host};
use super::normalize::{normalize_label, LabelForm};

type MemoKey = (String, bool);

/// A ruleset together with its trie and memo; replaced as a unit.
struct ActiveRules {
    rule_set: Arc<RuleSet>,
    trie: SuffixTrie,
    memo: Option<Mutex<LruCache<MemoKey, ExtractResult>>>,
}

impl ActiveRules {
    fn new(rule_set: Arc<RuleSet>, options: &ExtractOptions) -> Self {
        let trie = SuffixTrie::build(rule_set.rules()).with_extra_suffixes(&options.extra_suffixes);
        let memo = NonZeroUsize::new(options.memo_capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self {
            rule_set,
            trie,
            memo,
        }
    }

    fn extract(&self, input: &str, include_private: bool) -> ExtractResult {
        let Some(ref memo) = self.memo else {
            return self.compute(input, include_private);
        };

        let key = (input.to_string(), include_private);
        if let Some(hit) = memo.lock().get(&key) {
            return hit.clone();
        }

        // Computed unlocked; concurrent misses on one key store equal values
        let result = self.compute(input, include_private);
        memo.lock().put(key, result.clone());
        result
    }

    fn compute(&self, input: &str, include_private: bool) -> ExtractResult {
        let labels = match split_host(input) {
            Host::Name(labels) if !labels.is_empty() => labels,
            _ => return ExtractResult::default(),
        };

        let forms: Vec<LabelForm> = labels.iter().map(|label| normalize_label(label)).collect();
        let keys: Vec<&str> = forms.iter().map(LabelForm::as_str).collect();
        let matched = self.trie.lookup(&keys, include_private);

        ExtractResult::from_labels(labels, matched.suffix_len, matched.is_private)
    }
}

/// Splits hosts and URLs into subdomain, domain and public suffix.
///
/// Extraction never fails: unusable input and IP literals yield an empty
/// [`ExtractResult`]. The active ruleset can be refreshed while other threads
/// extract; readers keep the ruleset they started with.
///
/// # Example
///
/// ```rust
/// use psl_extract::Extractor;
///
/// let extractor = Extractor::snapshot().unwrap();
/// let result = extractor.extract("https://forums.news.cnn.com/path");
/// assert_eq!(result.subdomain_str(), "forums.news");
/// assert_eq!(result.registered_domain(), "cnn.com");
/// ```
pub struct Extractor {
    options: ExtractOptions,
    manager: Option<CacheManager>,
    active: RwLock<Arc<ActiveRules>>,
}

impl Extractor {
    /// Resolve the suffix list per `options` (fetching or reading the cache
    /// as needed) and build an extractor.
    pub fn new(options: ExtractOptions) -> Result<Self> {
        options.validate()?;
        Self::with_manager(CacheManager::from_options(&options))
    }

    /// Build an extractor around an existing cache manager.
    pub fn with_manager(manager: CacheManager) -> Result<Self> {
        let options = manager.options().clone();
        options.validate()?;
        let rule_set = manager.get_active_rule_set()?;
        let active = ActiveRules::new(Arc::new(rule_set), &options);
        Ok(Self {
            options,
            manager: Some(manager),
            active: RwLock::new(Arc::new(active)),
        })
    }

    /// Extractor over a fixed ruleset; [`update`](Self::update) is unavailable.
    pub fn from_rule_set(rule_set: RuleSet, options: ExtractOptions) -> Self {
        let active = ActiveRules::new(Arc::new(rule_set), &options);
        Self {
            options,
            manager: None,
            active: RwLock::new(Arc::new(active)),
        }
    }

    /// Extractor over the bundled snapshot, without network or cache.
    pub fn snapshot() -> Result<Self> {
        Ok(Self::from_rule_set(
            snapshot_rule_set()?,
            ExtractOptions::default(),
        ))
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    fn active(&self) -> Arc<ActiveRules> {
        self.active.read().clone()
    }

    /// Extract using the configured private-domain setting.
    pub fn extract(&self, input: &str) -> ExtractResult {
        self.extract_with(input, self.options.include_private_domains)
    }

    /// Extract, overriding the private-domain setting for this call.
    pub fn extract_with(&self, input: &str, include_private: bool) -> ExtractResult {
        self.active().extract(input, include_private)
    }

    /// Re-resolve the suffix list and swap it in.
    ///
    /// With `force` the cache freshness check is skipped and a fetch is always
    /// attempted. On failure the current ruleset stays active.
    pub fn update(&self, force: bool) -> Result<CacheStatus> {
        let manager = self.manager.as_ref().ok_or_else(|| {
            ExtractError::Config("extractor was built from a fixed ruleset".to_string())
        })?;

        let rule_set = if force {
            manager.force_refresh()?
        } else {
            manager.get_active_rule_set()?
        };
        self.install(rule_set);
        Ok(self.cache_status())
    }

    fn install(&self, rule_set: RuleSet) {
        let changed = !self.active().rule_set.same_content(&rule_set);
        // Built before taking the write lock
        let active = Arc::new(ActiveRules::new(Arc::new(rule_set), &self.options));
        *self.active.write() = active;
        tracing::debug!(changed, "active suffix list replaced");
    }

    /// Fingerprint, age and origin of the active ruleset.
    pub fn cache_status(&self) -> CacheStatus {
        let active = self.active();
        let rule_set = &active.rule_set;
        let age = rule_set.age();
        CacheStatus {
            origin: rule_set.origin().clone(),
            fingerprint: rule_set.fingerprint().to_string(),
            rule_count: rule_set.len(),
            retrieved_at: rule_set.retrieved_at(),
            age,
            stale: age > self.options.cache_max_age,
            cache_location: self.manager.as_ref().and_then(CacheManager::location),
        }
    }

    pub fn rule_set(&self) -> Arc<RuleSet> {
        self.active().rule_set.clone()
    }

    /// Normal and wildcard suffixes known to the active ruleset, extras
    /// included.
    pub fn suffixes(&self, include_private: bool) -> Vec<String> {
        self.active().trie.suffixes(include_private)
    }
}
