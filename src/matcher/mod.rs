mod trie;

pub use trie::{MatchKind, SuffixMatch, SuffixTrie};
