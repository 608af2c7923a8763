//! Integration tests for suffix list acquisition with an on-disk cache.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use psl_extract::{
    CacheManager, CacheRecord, CacheStorage, ExtractError, ExtractOptions, Extractor, FsStorage,
    MemoryFetcher, NilFetcher, Origin,
};

const URL: &str = "https://psl.example/public_suffix_list.dat";

const LIST: &str = "\
// ===BEGIN ICANN DOMAINS===
com
uk
co.uk
// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
github.io
// ===END PRIVATE DOMAINS===
";

fn options() -> ExtractOptions {
    ExtractOptions::new().with_cache_source_url(URL)
}

fn fs_manager(dir: &std::path::Path, fetcher: Arc<dyn psl_extract::Fetcher>) -> CacheManager {
    CacheManager::new(options(), Arc::new(FsStorage::new(dir)), fetcher)
}

mod fs_cache_tests {
    use super::*;

    #[test]
    fn test_download_is_reused_by_later_instances() {
        let dir = tempfile::tempdir().unwrap();

        let fetcher = Arc::new(MemoryFetcher::new().with_body(URL, LIST));
        let first = Extractor::with_manager(fs_manager(dir.path(), fetcher.clone())).unwrap();
        assert_eq!(first.cache_status().origin, Origin::Url(URL.to_string()));
        assert_eq!(fetcher.fetch_count(), 1);

        // A later instance with no network reads the fresh record
        let second = Extractor::with_manager(fs_manager(dir.path(), Arc::new(NilFetcher))).unwrap();
        let status = second.cache_status();
        assert_eq!(
            status.origin,
            Origin::Cache {
                source: URL.to_string(),
                stale: false
            }
        );
        assert_eq!(status.fingerprint, first.cache_status().fingerprint);
        assert!(status.cache_location.unwrap().ends_with(".dat"));
        assert_eq!(second.extract("www.example.co.uk").registered_domain(), "example.co.uk");
    }

    #[test]
    fn test_cache_files_are_verbatim_text_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let manager = fs_manager(
            dir.path(),
            Arc::new(MemoryFetcher::new().with_body(URL, LIST)),
        );
        manager.force_refresh().unwrap();

        let data = manager.location().unwrap();
        assert_eq!(fs::read_to_string(&data).unwrap(), LIST);

        let sidecar = format!("{}.meta.json", data);
        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(sidecar).unwrap()).unwrap();
        assert_eq!(meta["source"], URL);
        assert_eq!(meta["fingerprint"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn test_stale_record_used_when_fetch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let manager = fs_manager(dir.path(), Arc::new(NilFetcher));
        let old = CacheRecord::new(URL, LIST)
            .with_retrieved_at(SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60));
        FsStorage::new(dir.path())
            .store(manager.cache_key(), &old)
            .unwrap();

        let extractor = Extractor::with_manager(manager).unwrap();
        let status = extractor.cache_status();
        assert_eq!(
            status.origin,
            Origin::Cache {
                source: URL.to_string(),
                stale: true
            }
        );
        assert!(status.stale);
        assert_eq!(status.rule_count, 4);
    }

    #[test]
    fn test_corrupted_record_falls_back_to_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let manager = fs_manager(dir.path(), Arc::new(NilFetcher));
        let storage = FsStorage::new(dir.path());
        storage
            .store(manager.cache_key(), &CacheRecord::new(URL, LIST))
            .unwrap();
        // Truncated download left behind by some other writer
        fs::write(storage.data_path(manager.cache_key()), "<html>\n").unwrap();

        let extractor = Extractor::with_manager(manager).unwrap();
        assert_eq!(extractor.cache_status().origin, Origin::Snapshot);
        assert_eq!(
            extractor.extract("www.example.co.uk").registered_domain(),
            "example.co.uk"
        );
    }

    #[test]
    fn test_update_refreshes_stale_record() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path());
        let manager = fs_manager(
            dir.path(),
            Arc::new(MemoryFetcher::new().with_body(URL, LIST)),
        );
        let old = CacheRecord::new(URL, "com\n")
            .with_retrieved_at(SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60));
        storage.store(manager.cache_key(), &old).unwrap();
        let key = manager.cache_key().clone();

        let extractor = Extractor::with_manager(manager).unwrap();
        let status = extractor.update(true).unwrap();
        assert_eq!(status.origin, Origin::Url(URL.to_string()));
        assert_eq!(status.rule_count, 4);
        assert!(!status.stale);

        let record = storage.load(&key).unwrap().unwrap();
        assert_eq!(record.text, LIST);
    }

    #[test]
    fn test_clear_then_offline_uses_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let online = fs_manager(
            dir.path(),
            Arc::new(MemoryFetcher::new().with_body(URL, LIST)),
        );
        online.get_active_rule_set().unwrap();
        online.clear().unwrap();

        let offline = fs_manager(dir.path(), Arc::new(NilFetcher));
        let rule_set = offline.get_active_rule_set().unwrap();
        assert_eq!(rule_set.origin(), &Origin::Snapshot);
    }
}

mod explicit_source_tests {
    use super::*;

    #[test]
    fn test_local_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.dat");
        fs::write(&path, "internal\ncorp.internal\n").unwrap();

        let extractor = Extractor::new(
            ExtractOptions::new()
                .without_disk_cache()
                .with_suffix_list_source(path.to_str().unwrap()),
        )
        .unwrap();

        assert_eq!(extractor.cache_status().origin, Origin::File(path));
        let result = extractor.extract("build.team.corp.internal");
        assert_eq!(result.suffix_str(), "corp.internal");
        assert_eq!(result.domain, "team");
    }

    #[test]
    fn test_missing_file_without_snapshot_is_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.dat");

        let result = Extractor::new(
            ExtractOptions::new()
                .without_disk_cache()
                .with_suffix_list_source(path.to_str().unwrap())
                .with_fallback_to_snapshot(false),
        );
        assert!(matches!(result, Err(ExtractError::Exhausted { .. })));
    }

    #[test]
    fn test_missing_file_falls_back_to_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Extractor::new(
            ExtractOptions::new()
                .without_disk_cache()
                .with_suffix_list_source(dir.path().join("missing.dat").to_str().unwrap()),
        )
        .unwrap();
        assert_eq!(extractor.cache_status().origin, Origin::Snapshot);
    }

    #[test]
    fn test_inline_text() {
        let extractor = Extractor::new(
            ExtractOptions::new()
                .without_disk_cache()
                .with_suffix_list_text(LIST)
                .with_private_domains(true),
        )
        .unwrap();

        assert_eq!(extractor.cache_status().origin, Origin::Inline);
        assert_eq!(
            extractor.extract("me.github.io").registered_domain(),
            "me.github.io"
        );
    }

    #[test]
    fn test_invalid_options_rejected() {
        let result = Extractor::new(ExtractOptions::new().with_fetch_timeout(Duration::ZERO));
        assert!(matches!(result, Err(ExtractError::Config(_))));
    }
}
