//! Suffix list cache: records, storage backends and the tier runner.

mod manager;
mod record;
mod storage;

pub use manager::CacheManager;
pub use record::{CacheMetadata, CacheRecord};
pub use storage::{CacheKey, CacheStorage, FsStorage, MemoryStorage};
