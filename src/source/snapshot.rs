//! Bundled copy of the Public Suffix List, used only as a last resort.

use crate::error::Result;
use crate::ruleset::RuleSet;
use crate::types::Origin;

/// Suffix list text shipped with the crate
pub const SNAPSHOT_TEXT: &str = include_str!("../../data/public_suffix_list.dat");

/// Parse the bundled snapshot.
pub fn snapshot_rule_set() -> Result<RuleSet> {
    RuleSet::from_text(SNAPSHOT_TEXT, Origin::Snapshot)
}
