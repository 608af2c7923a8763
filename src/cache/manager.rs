use std::sync::Arc;
use std::time::Duration;

use crate::config::ExtractOptions;
use crate::error::{ExtractError, Result};
use crate::ruleset::RuleSet;
use crate::source::{plan, snapshot_rule_set, Fetcher, HttpFetcher, SuffixListSource, Tier};
use crate::types::Origin;

use super::record::CacheRecord;
use super::storage::{CacheKey, CacheStorage, FsStorage, MemoryStorage};

/// Supplies the active ruleset by walking the fallback tiers.
///
/// One manager owns one storage backend; construct it once and share it
/// rather than creating a manager per extraction.
pub struct CacheManager {
    storage: Arc<dyn CacheStorage>,
    source: SuffixListSource,
    options: ExtractOptions,
    key: CacheKey,
}

impl CacheManager {
    /// Manager with the storage and HTTP fetcher `options` describe.
    pub fn from_options(options: &ExtractOptions) -> Self {
        let storage: Arc<dyn CacheStorage> = if !options.cache_enabled {
            Arc::new(MemoryStorage::new())
        } else if let Some(ref path) = options.cache_file_path {
            Arc::new(FsStorage::at_path(path))
        } else {
            Arc::new(FsStorage::new(options.resolved_cache_dir()))
        };
        Self::new(options.clone(), storage, Arc::new(HttpFetcher::new()))
    }

    pub fn new(
        options: ExtractOptions,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let source = SuffixListSource::new(fetcher, options.fetch_timeout);
        let key = CacheKey::for_source(options.suffix_list_urls.join(" "));
        Self {
            storage,
            source,
            options,
            key,
        }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Key of the record for the configured remote endpoints
    pub fn cache_key(&self) -> &CacheKey {
        &self.key
    }

    /// Where the cache record lives, if on disk
    pub fn location(&self) -> Option<String> {
        self.storage.location(&self.key)
    }

    pub fn max_age(&self) -> Duration {
        self.options.cache_max_age
    }

    /// Ruleset from the first tier that succeeds.
    ///
    /// A fresh cached record is used without fetching unless the options
    /// ask for a forced refresh.
    pub fn get_active_rule_set(&self) -> Result<RuleSet> {
        self.run(&plan(&self.options, self.options.force_refresh))
    }

    /// Always attempt a fetch, falling back to cache then snapshot.
    pub fn force_refresh(&self) -> Result<RuleSet> {
        self.run(&plan(&self.options, true))
    }

    /// Remove the cached record for the configured endpoints.
    pub fn clear(&self) -> Result<()> {
        tracing::info!(source = %self.key.source, "clearing suffix list cache");
        self.storage.remove(&self.key)
    }

    fn run(&self, tiers: &[Tier]) -> Result<RuleSet> {
        let mut attempts = Vec::new();

        for tier in tiers {
            tracing::debug!(tier = %tier, "resolving suffix list");
            match self.try_tier(tier) {
                Ok(rule_set) => {
                    if *tier == Tier::Snapshot && !attempts.is_empty() {
                        tracing::warn!(
                            failed = %attempts.join("; "),
                            "falling back to bundled suffix list snapshot"
                        );
                    }
                    tracing::info!(
                        origin = %rule_set.origin(),
                        rules = rule_set.len(),
                        fingerprint = %rule_set.fingerprint(),
                        "suffix list loaded"
                    );
                    return Ok(rule_set);
                }
                Err(ExtractError::CacheMiss(reason)) => {
                    tracing::debug!(tier = %tier, reason = %reason, "suffix list tier skipped");
                    attempts.push(format!("{}: {}", tier, reason));
                }
                Err(e) => {
                    tracing::warn!(tier = %tier, error = %e, "suffix list tier failed");
                    attempts.push(format!("{}: {}", tier, e));
                }
            }
        }

        Err(ExtractError::Exhausted { attempts })
    }

    fn try_tier(&self, tier: &Tier) -> Result<RuleSet> {
        match tier {
            Tier::Inline => {
                let text = self.options.suffix_list_text.as_deref().unwrap_or_default();
                RuleSet::from_text(text, Origin::Inline)
            }
            Tier::Explicit(location) => {
                let (text, origin) = self.source.fetch(location)?;
                RuleSet::from_text(&text, origin)
            }
            Tier::FreshCache => {
                let record = self.load_record()?;
                if record.is_stale(self.max_age()) {
                    return Err(ExtractError::CacheMiss(format!(
                        "record is {}s old",
                        record.age().as_secs()
                    )));
                }
                record.to_rule_set(false)
            }
            Tier::Remote => self.fetch_remote(),
            Tier::StaleCache => {
                let record = self.load_record()?;
                let stale = record.is_stale(self.max_age());
                let rule_set = record.to_rule_set(stale)?;
                if stale {
                    tracing::warn!(
                        source = %record.source,
                        age_secs = record.age().as_secs(),
                        "using stale cached suffix list"
                    );
                }
                Ok(rule_set)
            }
            Tier::Snapshot => snapshot_rule_set(),
        }
    }

    /// The record for this manager's endpoints; a record written for another
    /// source identity counts as absent.
    fn load_record(&self) -> Result<CacheRecord> {
        match self.storage.load(&self.key)? {
            Some(record) if record.source == self.key.source => Ok(record),
            Some(record) => Err(ExtractError::CacheMiss(format!(
                "record belongs to '{}'",
                record.source
            ))),
            None => Err(ExtractError::CacheMiss("no cached record".to_string())),
        }
    }

    /// Fetch, validate, then replace the cached record.
    fn fetch_remote(&self) -> Result<RuleSet> {
        let (text, url) = self.source.fetch_first(&self.options.suffix_list_urls)?;
        let rule_set = RuleSet::from_text(&text, Origin::Url(url.clone()))?;

        let record = CacheRecord::new(self.key.source.clone(), text)
            .with_retrieved_at(rule_set.retrieved_at());
        match self.storage.store(&self.key, &record) {
            Ok(()) => tracing::info!(
                source = %url,
                rules = rule_set.len(),
                location = ?self.location(),
                "suffix list cached"
            ),
            Err(e) => tracing::warn!(source = %url, error = %e, "failed to write suffix list cache"),
        }
        Ok(rule_set)
    }
}
