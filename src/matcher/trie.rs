//! Suffix trie over reversed label sequences.
//!
//! Rules are indexed TLD first. Each node carries at most one marker per rule
//! kind for its path; wildcard markers live on the node of the wildcard's own
//! path (`*.ck` marks the `ck` node). Labels are stored in the same form
//! [`normalize_label`] gives host labels, so `xn--55qx5d` and `公司` share a
//! node.

use std::collections::HashMap;

use crate::extract::normalize_label;
use crate::types::{Rule, RuleKind};

/// Marker left on a trie node by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker {
    private: bool,
}

impl Marker {
    /// ICANN wins when the same rule appears in both sections.
    fn merge(slot: &mut Option<Marker>, private: bool) {
        match slot {
            Some(existing) if existing.private && !private => existing.private = false,
            Some(_) => {}
            None => *slot = Some(Marker { private }),
        }
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<String, TrieNode>,
    normal: Option<Marker>,
    wildcard: Option<Marker>,
    exception: Option<Marker>,
}

/// How the public suffix of a lookup was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Normal,
    Wildcard,
    Exception,
    /// No rule matched; the rightmost label is the suffix
    Implicit,
}

/// Result of [`SuffixTrie::lookup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixMatch {
    /// Number of rightmost labels forming the public suffix
    pub suffix_len: usize,
    /// Prevailing rule is from the PRIVATE DOMAINS section
    pub is_private: bool,
    pub kind: MatchKind,
}

/// Build-once, read-many index of suffix list rules
#[derive(Debug, Default)]
pub struct SuffixTrie {
    root: TrieNode,
    rule_count: usize,
}

impl SuffixTrie {
    /// Build a trie from parsed rules.
    pub fn build<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> Self {
        let mut trie = Self::default();
        for rule in rules {
            trie.insert(rule.reversed_labels(), rule.kind, rule.private);
        }
        trie
    }

    /// Add caller-supplied suffixes as ICANN normal rules.
    pub fn with_extra_suffixes<S: AsRef<str>>(mut self, suffixes: &[S]) -> Self {
        for suffix in suffixes {
            let suffix = suffix.as_ref().trim().trim_matches('.').to_lowercase();
            if suffix.is_empty() || suffix.split('.').any(str::is_empty) {
                continue;
            }
            self.insert(suffix.rsplit('.'), RuleKind::Normal, false);
        }
        self
    }

    fn insert<'a>(&mut self, reversed: impl Iterator<Item = &'a str>, kind: RuleKind, private: bool) {
        let mut node = &mut self.root;
        for label in reversed {
            let key = normalize_label(label).as_str().to_owned();
            node = node.children.entry(key).or_default();
        }

        let slot = match kind {
            RuleKind::Normal => &mut node.normal,
            RuleKind::Wildcard => &mut node.wildcard,
            RuleKind::Exception => &mut node.exception,
        };
        Marker::merge(slot, private);
        self.rule_count += 1;
    }

    /// Number of rules inserted (duplicates included)
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Find the public suffix of `labels` (left to right, already normalized).
    ///
    /// An exception on the walked path prevails over everything and yields its
    /// own path minus the leftmost label. Otherwise the longest normal or
    /// wildcard match wins, a wildcard covering one label beyond its path. With
    /// no match the rightmost label alone is the suffix.
    ///
    /// Private rules are ignored unless `include_private` is set.
    pub fn lookup<S: AsRef<str>>(&self, labels: &[S], include_private: bool) -> SuffixMatch {
        let accept = |marker: Option<Marker>| marker.filter(|m| include_private || !m.private);

        let mut node = &self.root;
        let mut best: Option<SuffixMatch> = None;

        for (depth, label) in labels.iter().rev().enumerate() {
            if let Some(m) = accept(node.wildcard) {
                best = Some(SuffixMatch {
                    suffix_len: depth + 1,
                    is_private: m.private,
                    kind: MatchKind::Wildcard,
                });
            }

            let label: &str = label.as_ref();
            let Some(child) = node.children.get(label) else {
                break;
            };

            if let Some(m) = accept(child.exception) {
                return SuffixMatch {
                    suffix_len: depth,
                    is_private: m.private,
                    kind: MatchKind::Exception,
                };
            }

            if let Some(m) = accept(child.normal) {
                best = Some(SuffixMatch {
                    suffix_len: depth + 1,
                    is_private: m.private,
                    kind: MatchKind::Normal,
                });
            }

            node = child;
        }

        best.unwrap_or(SuffixMatch {
            suffix_len: labels.len().min(1),
            is_private: false,
            kind: MatchKind::Implicit,
        })
    }

    /// Every normal and wildcard suffix in the trie, sorted.
    pub fn suffixes(&self, include_private: bool) -> Vec<String> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect(&self.root, &mut path, include_private, &mut out);
        out.sort();
        out
    }
}

fn collect<'a>(
    node: &'a TrieNode,
    path: &mut Vec<&'a str>,
    include_private: bool,
    out: &mut Vec<String>,
) {
    let visible = |m: &Option<Marker>| m.map_or(false, |m| include_private || !m.private);
    let joined = || path.iter().rev().copied().collect::<Vec<_>>().join(".");

    if visible(&node.normal) {
        out.push(joined());
    }
    if visible(&node.wildcard) {
        out.push(format!("*.{}", joined()));
    }

    for (label, child) in &node.children {
        path.push(label);
        collect(child, path, include_private, out);
        path.pop();
    }
}
