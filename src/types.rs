use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// Kind of a suffix list rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// `co.uk` - the exact label sequence is a public suffix
    Normal,
    /// `*.ck` - the suffix plus exactly one more label is a public suffix
    Wildcard,
    /// `!www.ck` - carves a host out of a wildcard
    Exception,
}

/// A single parsed suffix list rule.
///
/// `labels` are stored left to right as written, without the `*.` or `!`
/// prefix: `*.kawasaki.jp` is `["kawasaki", "jp"]` with kind `Wildcard`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub labels: Vec<String>,
    pub kind: RuleKind,
    /// Rule comes from the PRIVATE DOMAINS section
    pub private: bool,
}

impl Rule {
    pub fn new(labels: Vec<String>, kind: RuleKind, private: bool) -> Self {
        Self {
            labels,
            kind,
            private,
        }
    }

    /// Labels from the TLD inwards, the order the trie is keyed by.
    pub fn reversed_labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().rev().map(String::as_str)
    }

    /// The rule as it would appear in the list text.
    pub fn to_rule_text(&self) -> String {
        let joined = self.labels.join(".");
        match self.kind {
            RuleKind::Normal => joined,
            RuleKind::Wildcard => format!("*.{}", joined),
            RuleKind::Exception => format!("!{}", joined),
        }
    }
}

/// Result of splitting a host into subdomain, domain and public suffix.
///
/// All label sequences are left to right as they appear in the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtractResult {
    /// Labels left of the registrable domain
    pub subdomain: Vec<String>,
    /// The label immediately left of the public suffix
    pub domain: String,
    /// The matched public suffix labels
    pub suffix: Vec<String>,
    /// Prevailing rule came from the PRIVATE DOMAINS section
    pub is_private: bool,
}

impl ExtractResult {
    pub(crate) fn from_labels(mut labels: Vec<String>, suffix_len: usize, is_private: bool) -> Self {
        let suffix = labels.split_off(labels.len() - suffix_len);
        let domain = labels.pop().unwrap_or_default();
        Self {
            subdomain: labels,
            domain,
            suffix,
            is_private,
        }
    }

    /// All fields empty (IP literal or unusable input).
    pub fn is_empty(&self) -> bool {
        self.subdomain.is_empty() && self.domain.is_empty() && self.suffix.is_empty()
    }

    /// Subdomain labels joined with dots.
    pub fn subdomain_str(&self) -> String {
        self.subdomain.join(".")
    }

    /// Suffix labels joined with dots.
    pub fn suffix_str(&self) -> String {
        self.suffix.join(".")
    }

    /// Domain plus suffix, e.g. `example.co.uk`.
    ///
    /// Empty unless both a domain label and a suffix are present.
    pub fn registered_domain(&self) -> String {
        if self.domain.is_empty() || self.suffix.is_empty() {
            return String::new();
        }
        format!("{}.{}", self.domain, self.suffix_str())
    }

    /// Alias of [`registered_domain`](Self::registered_domain).
    pub fn top_domain_under_public_suffix(&self) -> String {
        self.registered_domain()
    }

    /// Full host name, or empty when there is no registered domain.
    pub fn fqdn(&self) -> String {
        if self.registered_domain().is_empty() {
            return String::new();
        }
        self.subdomain
            .iter()
            .chain(std::iter::once(&self.domain))
            .chain(self.suffix.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Suffix first, then domain, then subdomains: `co.uk.example.www`.
    pub fn reverse_domain_name(&self) -> String {
        let mut parts: Vec<&str> = self.suffix.iter().map(String::as_str).collect();
        if !self.domain.is_empty() {
            parts.push(&self.domain);
        }
        parts.extend(self.subdomain.iter().rev().map(String::as_str));
        parts.join(".")
    }
}

impl fmt::Display for ExtractResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.subdomain_str(),
            self.domain,
            self.suffix_str()
        )
    }
}

/// Where the rule text of a ruleset came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Caller-supplied in-memory text
    Inline,
    /// Explicit local file
    File(PathBuf),
    /// Fetched from a URL
    Url(String),
    /// Read from the on-disk or in-memory cache
    Cache { source: String, stale: bool },
    /// Bundled snapshot shipped with the crate
    Snapshot,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Inline => write!(f, "inline"),
            Origin::File(path) => write!(f, "file {}", path.display()),
            Origin::Url(url) => write!(f, "url {}", url),
            Origin::Cache { source, stale } => {
                write!(f, "cache of {}", source)?;
                if *stale {
                    write!(f, " (stale)")?;
                }
                Ok(())
            }
            Origin::Snapshot => write!(f, "bundled snapshot"),
        }
    }
}

/// Report on the ruleset an extractor is currently using
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub origin: Origin,
    pub fingerprint: String,
    pub rule_count: usize,
    pub retrieved_at: SystemTime,
    pub age: Duration,
    /// Older than the configured maximum age
    pub stale: bool,
    /// Cache record location, if a cache is in use
    pub cache_location: Option<String>,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "origin:      {}", self.origin)?;
        writeln!(f, "fingerprint: {}", self.fingerprint)?;
        writeln!(f, "rules:       {}", self.rule_count)?;
        write!(f, "age:         {}s", self.age.as_secs())?;
        if self.stale {
            write!(f, " (stale)")?;
        }
        if let Some(ref location) = self.cache_location {
            write!(f, "\ncache:       {}", location)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(s: &str) -> Vec<String> {
        s.split('.').map(String::from).collect()
    }

    #[test]
    fn test_from_labels_splits_three_parts() {
        let result = ExtractResult::from_labels(labels("a.b.example.co.uk"), 2, false);
        assert_eq!(result.subdomain, vec!["a", "b"]);
        assert_eq!(result.domain, "example");
        assert_eq!(result.suffix, vec!["co", "uk"]);
        assert_eq!(result.registered_domain(), "example.co.uk");
        assert_eq!(result.fqdn(), "a.b.example.co.uk");
        assert_eq!(result.subdomain_str(), "a.b");
    }

    #[test]
    fn test_bare_suffix_has_no_registered_domain() {
        let result = ExtractResult::from_labels(labels("co.uk"), 2, false);
        assert!(result.domain.is_empty());
        assert!(result.subdomain.is_empty());
        assert_eq!(result.registered_domain(), "");
        assert_eq!(result.fqdn(), "");
        assert!(!result.is_empty());
    }

    #[test]
    fn test_reverse_domain_name() {
        let result = ExtractResult::from_labels(labels("www.api.example.co.uk"), 2, false);
        assert_eq!(result.reverse_domain_name(), "co.uk.example.api.www");
    }

    #[test]
    fn test_default_is_empty() {
        let result = ExtractResult::default();
        assert!(result.is_empty());
        assert_eq!(result.registered_domain(), "");
        assert_eq!(result.reverse_domain_name(), "");
    }

    #[test]
    fn test_rule_text_round_trip_forms() {
        let wildcard = Rule::new(labels("kawasaki.jp"), RuleKind::Wildcard, false);
        assert_eq!(wildcard.to_rule_text(), "*.kawasaki.jp");
        let exception = Rule::new(labels("city.kawasaki.jp"), RuleKind::Exception, false);
        assert_eq!(exception.to_rule_text(), "!city.kawasaki.jp");
        assert_eq!(
            exception.reversed_labels().collect::<Vec<_>>(),
            vec!["jp", "kawasaki", "city"]
        );
    }

    #[test]
    fn test_origin_display() {
        let origin = Origin::Cache {
            source: "https://example.com/list.dat".into(),
            stale: true,
        };
        assert_eq!(
            origin.to_string(),
            "cache of https://example.com/list.dat (stale)"
        );
        assert_eq!(Origin::Snapshot.to_string(), "bundled snapshot");
    }
}
