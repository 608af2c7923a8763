pub mod fetch;
pub mod location;
pub mod resolve;
pub mod snapshot;

pub use fetch::{Fetcher, HttpFetcher, MemoryFetcher, NilFetcher};
pub use location::{
    SuffixListLocation, DEFAULT_SUFFIX_LIST_URLS, PUBLIC_SUFFIX_LIST_MIRROR_URL,
    PUBLIC_SUFFIX_LIST_URL,
};
pub use resolve::{plan, SuffixListSource, Tier};
pub use snapshot::{snapshot_rule_set, SNAPSHOT_TEXT};
