use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::error::Result;
use crate::parser::fingerprint;

use super::record::{CacheMetadata, CacheRecord};

/// Distinguishes temp files of concurrent writers within one process
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifies the cache record of one source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Source identity (URL list or path)
    pub source: String,
    /// Deterministic file stem derived from `source`
    pub name: String,
}

impl CacheKey {
    pub fn for_source(source: impl Into<String>) -> Self {
        let source = source.into();
        let name = format!("psl-{}", &fingerprint(&source)[..16]);
        Self { source, name }
    }
}

/// Trait for persisting cache records
pub trait CacheStorage: Send + Sync {
    /// Load the record for `key`; `Ok(None)` if there is none.
    fn load(&self, key: &CacheKey) -> Result<Option<CacheRecord>>;

    /// Replace the record for `key`. Readers never see a partial record.
    fn store(&self, key: &CacheKey, record: &CacheRecord) -> Result<()>;

    /// Delete the record for `key`, if any.
    fn remove(&self, key: &CacheKey) -> Result<()>;

    /// Human-readable location of the record
    fn location(&self, key: &CacheKey) -> Option<String>;
}

/// Filesystem storage: `<name>.dat` holds the list text verbatim and
/// `<name>.dat.meta.json` the metadata sidecar.
#[derive(Debug, Clone)]
pub struct FsStorage {
    dir: PathBuf,
    pinned: Option<PathBuf>,
}

impl FsStorage {
    /// Store records under `dir`, one file per source.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            pinned: None,
        }
    }

    /// Store every record in exactly this file.
    pub fn at_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            dir,
            pinned: Some(path),
        }
    }

    /// Path of the list text for `key`
    pub fn data_path(&self, key: &CacheKey) -> PathBuf {
        match self.pinned {
            Some(ref path) => path.clone(),
            None => self.dir.join(format!("{}.dat", key.name)),
        }
    }

    /// Path of the metadata sidecar for `key`: the data file name plus
    /// `.meta.json`, never the data file itself.
    pub fn metadata_path(&self, key: &CacheKey) -> PathBuf {
        let data_path = self.data_path(key);
        let mut name = data_path.file_name().unwrap_or_default().to_os_string();
        name.push(".meta.json");
        data_path.with_file_name(name)
    }

    fn read_metadata(path: &Path) -> Option<CacheMetadata> {
        let json = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&json) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable cache metadata");
                None
            }
        }
    }
}

impl CacheStorage for FsStorage {
    fn load(&self, key: &CacheKey) -> Result<Option<CacheRecord>> {
        let data_path = self.data_path(key);
        let text = match fs::read_to_string(&data_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let actual = fingerprint(&text);
        let record = match Self::read_metadata(&self.metadata_path(key)) {
            Some(meta) if meta.fingerprint == actual => CacheRecord {
                source: meta.source,
                fingerprint: actual,
                retrieved_at: meta.retrieved_at,
                text,
            },
            // Sidecar missing or from another write: trust the data file's mtime
            _ => {
                let retrieved_at = fs::metadata(&data_path)
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                CacheRecord {
                    source: key.source.clone(),
                    fingerprint: actual,
                    retrieved_at,
                    text,
                }
            }
        };
        Ok(Some(record))
    }

    fn store(&self, key: &CacheKey, record: &CacheRecord) -> Result<()> {
        let data_path = self.data_path(key);
        if let Some(parent) = data_path.parent() {
            fs::create_dir_all(parent)?;
        }

        write_atomic(&data_path, record.text.as_bytes())?;
        let json = serde_json::to_string_pretty(&record.metadata())?;
        write_atomic(&self.metadata_path(key), json.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        for path in [self.data_path(key), self.metadata_path(key)] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn location(&self, key: &CacheKey) -> Option<String> {
        Some(self.data_path(key).display().to_string())
    }
}

/// Write to a temp file in the same directory, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let tmp_path = path.with_file_name(name);

    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// In-memory storage, used when the disk cache is disabled and in tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, CacheRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record.
    pub fn insert(&self, key: &CacheKey, record: CacheRecord) {
        self.records.lock().insert(key.name.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl CacheStorage for MemoryStorage {
    fn load(&self, key: &CacheKey) -> Result<Option<CacheRecord>> {
        Ok(self.records.lock().get(&key.name).cloned())
    }

    fn store(&self, key: &CacheKey, record: &CacheRecord) -> Result<()> {
        self.insert(key, record.clone());
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        self.records.lock().remove(&key.name);
        Ok(())
    }

    fn location(&self, _key: &CacheKey) -> Option<String> {
        None
    }
}
