use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parser::fingerprint;
use crate::ruleset::RuleSet;
use crate::types::Origin;

/// Sidecar stored next to the cached list text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Source identity the text was fetched for
    pub source: String,
    pub fingerprint: String,
    pub retrieved_at: SystemTime,
}

/// Cached suffix list text plus its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub source: String,
    pub fingerprint: String,
    pub retrieved_at: SystemTime,
    /// Rule text exactly as fetched
    pub text: String,
}

impl CacheRecord {
    /// Record for text retrieved now.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            source: source.into(),
            fingerprint: fingerprint(&text),
            retrieved_at: SystemTime::now(),
            text,
        }
    }

    pub fn with_retrieved_at(mut self, retrieved_at: SystemTime) -> Self {
        self.retrieved_at = retrieved_at;
        self
    }

    pub fn metadata(&self) -> CacheMetadata {
        CacheMetadata {
            source: self.source.clone(),
            fingerprint: self.fingerprint.clone(),
            retrieved_at: self.retrieved_at,
        }
    }

    pub fn age(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.retrieved_at)
            .unwrap_or_default()
    }

    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }

    /// Parse the cached text; fails like any corrupted download would.
    pub fn to_rule_set(&self, stale: bool) -> Result<RuleSet> {
        let origin = Origin::Cache {
            source: self.source.clone(),
            stale,
        };
        Ok(RuleSet::from_text(&self.text, origin)?.with_retrieved_at(self.retrieved_at))
    }
}
