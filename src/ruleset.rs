use std::time::{Duration, SystemTime};

use crate::error::Result;
use crate::parser::parse_rules;
use crate::types::{Origin, Rule};

/// A parsed, immutable suffix list with its provenance.
///
/// Two rulesets with the same fingerprint were parsed from identical text
/// and are interchangeable.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    fingerprint: String,
    origin: Origin,
    retrieved_at: SystemTime,
    skipped: usize,
}

impl RuleSet {
    /// Parse rule text retrieved now from `origin`.
    pub fn from_text(text: &str, origin: Origin) -> Result<Self> {
        let parsed = parse_rules(text)?;
        Ok(Self {
            rules: parsed.rules,
            fingerprint: parsed.fingerprint,
            origin,
            retrieved_at: SystemTime::now(),
            skipped: parsed.skipped,
        })
    }

    /// Override the retrieval time; cache records keep the time of their fetch.
    pub fn with_retrieved_at(mut self, retrieved_at: SystemTime) -> Self {
        self.retrieved_at = retrieved_at;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn retrieved_at(&self) -> SystemTime {
        self.retrieved_at
    }

    /// Lines the parser did not understand
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Time since retrieval; zero if the clock went backwards.
    pub fn age(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.retrieved_at)
            .unwrap_or_default()
    }

    /// Same rule content as `other`.
    pub fn same_content(&self, other: &RuleSet) -> bool {
        self.fingerprint == other.fingerprint
    }
}
