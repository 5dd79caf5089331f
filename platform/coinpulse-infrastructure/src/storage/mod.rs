use coinpulse_domain::errors::DatasetError;
use coinpulse_domain::repositories::cache::{
    CachedDataset, DatasetCache, DatasetSpec, RemoteFileSource,
};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const FINGERPRINT_CHARS: usize = 12;

/// Cache-aside store of downloaded datasets under one directory.
///
/// A present, non-empty file is an immutable snapshot until [`DatasetCache::invalidate`]
/// removes it. Downloads land in a `.part` sibling first so an interrupted fetch
/// never leaves a truncated snapshot behind.
pub struct FilesystemDatasetCache<S> {
    dir: PathBuf,
    source: S,
}

impl<S: RemoteFileSource> FilesystemDatasetCache<S> {
    pub fn new(dir: impl Into<PathBuf>, source: S) -> Self {
        Self {
            dir: dir.into(),
            source,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, spec: &DatasetSpec) -> PathBuf {
        self.dir.join(&spec.file_name)
    }

    fn part_path(&self, spec: &DatasetSpec) -> PathBuf {
        self.dir.join(format!("{}.part", spec.file_name))
    }

    fn download(&self, spec: &DatasetSpec, path: &Path) -> Result<u64, DatasetError> {
        let Some(token) = spec.token.as_deref().filter(|t| !t.trim().is_empty()) else {
            return Err(DatasetError::fetch(
                &spec.name,
                format!("no token configured and no cached copy at {}", path.display()),
            ));
        };

        fs::create_dir_all(&self.dir).map_err(|err| {
            DatasetError::io(
                &spec.name,
                format!("failed to create cache dir {}: {}", self.dir.display(), err),
            )
        })?;

        let part = self.part_path(spec);
        if let Err(reason) = self.source.download(token, &part) {
            let _ = fs::remove_file(&part);
            return Err(DatasetError::fetch(&spec.name, reason));
        }

        let bytes = fs::metadata(&part).map(|m| m.len()).unwrap_or(0);
        if bytes == 0 {
            let _ = fs::remove_file(&part);
            return Err(DatasetError::fetch(&spec.name, "downloaded file is empty"));
        }

        fs::rename(&part, path).map_err(|err| {
            DatasetError::io(
                &spec.name,
                format!("failed to move download into {}: {}", path.display(), err),
            )
        })?;
        Ok(bytes)
    }
}

fn cached_len(path: &Path) -> Option<u64> {
    fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .filter(|len| *len > 0)
}

fn fingerprint(dataset: &str, path: &Path) -> Result<String, DatasetError> {
    let bytes = fs::read(path).map_err(|err| {
        DatasetError::io(
            dataset,
            format!("failed to read cached file {}: {}", path.display(), err),
        )
    })?;
    let digest = Sha256::digest(&bytes);
    Ok(to_hex_short(&digest[..], FINGERPRINT_CHARS))
}

fn to_hex_short(bytes: &[u8], chars: usize) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(chars);
    for b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        if out.len() >= chars {
            break;
        }
        out.push(HEX[(b & 0x0f) as usize] as char);
        if out.len() >= chars {
            break;
        }
    }
    out
}

fn record_fetch_metrics(
    dataset: &str,
    outcome: &'static str,
    start: Instant,
    result: &Result<CachedDataset, DatasetError>,
) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "coinpulse.infra.cache.fetch_total",
        "dataset" => dataset.to_string(),
        "outcome" => outcome,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("coinpulse.infra.cache.fetch_ms", "outcome" => outcome)
        .record(start.elapsed().as_millis() as f64);
}

impl<S: RemoteFileSource> DatasetCache for FilesystemDatasetCache<S> {
    fn fetch(&self, spec: &DatasetSpec) -> Result<CachedDataset, DatasetError> {
        let path = self.path_for(spec);
        let _span = tracing::info_span!(
            "infra.cache.fetch",
            dataset = %spec.name,
            path = %path.display()
        )
        .entered();
        let start = Instant::now();

        if let Some(bytes) = cached_len(&path) {
            let result = fingerprint(&spec.name, &path).map(|fingerprint| CachedDataset {
                path: path.clone(),
                bytes,
                fingerprint,
                downloaded: false,
            });
            record_fetch_metrics(&spec.name, "hit", start, &result);
            tracing::debug!(bytes, "using cached dataset");
            return result;
        }

        let result = self.download(spec, &path).and_then(|bytes| {
            Ok(CachedDataset {
                fingerprint: fingerprint(&spec.name, &path)?,
                path: path.clone(),
                bytes,
                downloaded: true,
            })
        });
        record_fetch_metrics(&spec.name, "miss", start, &result);
        match &result {
            Ok(cached) => tracing::info!(
                bytes = cached.bytes,
                fingerprint = %cached.fingerprint,
                "downloaded dataset"
            ),
            Err(err) => tracing::warn!(error = %err, "dataset fetch failed"),
        }
        result
    }

    fn invalidate(&self, spec: &DatasetSpec) -> Result<bool, DatasetError> {
        let path = self.path_for(spec);
        let _ = fs::remove_file(self.part_path(spec));
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|err| {
            DatasetError::io(
                &spec.name,
                format!("failed to remove cached file {}: {}", path.display(), err),
            )
        })?;
        metrics::counter!("coinpulse.infra.cache.invalidations_total", "dataset" => spec.name.clone())
            .increment(1);
        tracing::info!(dataset = %spec.name, path = %path.display(), "invalidated cached dataset");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{to_hex_short, FilesystemDatasetCache};
    use coinpulse_domain::repositories::cache::{DatasetCache, DatasetSpec, RemoteFileSource};
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_path(name: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("coinpulse_{name}_{}_{}", std::process::id(), now))
    }

    struct FakeSource {
        payload: RefCell<Vec<u8>>,
        fail: Option<String>,
        calls: Cell<u32>,
    }

    impl FakeSource {
        fn serving(payload: &str) -> Self {
            Self {
                payload: RefCell::new(payload.as_bytes().to_vec()),
                fail: None,
                calls: Cell::new(0),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                payload: RefCell::new(Vec::new()),
                fail: Some(reason.to_string()),
                calls: Cell::new(0),
            }
        }
    }

    impl RemoteFileSource for FakeSource {
        fn download(&self, _token: &str, dest: &Path) -> Result<u64, String> {
            self.calls.set(self.calls.get() + 1);
            if let Some(reason) = &self.fail {
                return Err(reason.clone());
            }
            let payload = self.payload.borrow();
            fs::write(dest, &*payload).map_err(|err| err.to_string())?;
            Ok(payload.len() as u64)
        }
    }

    fn spec(token: Option<&str>) -> DatasetSpec {
        DatasetSpec {
            name: "sentiment".to_string(),
            token: token.map(str::to_string),
            file_name: "merged_crypto.csv".to_string(),
        }
    }

    #[test]
    fn downloads_once_then_serves_the_snapshot() {
        let dir = unique_tmp_path("cache_hit");
        let cache = FilesystemDatasetCache::new(&dir, FakeSource::serving("date|crypto\n"));

        let first = cache.fetch(&spec(Some("abc"))).expect("first fetch");
        assert!(first.downloaded);
        assert_eq!(first.bytes, 13);
        assert_eq!(first.fingerprint.len(), 12);

        let second = cache.fetch(&spec(Some("abc"))).expect("second fetch");
        assert!(!second.downloaded);
        assert_eq!(second.fingerprint, first.fingerprint);
        assert_eq!(cache.source.calls.get(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_download_is_a_recoverable_fetch_error_and_leaves_nothing() {
        let dir = unique_tmp_path("cache_empty");
        let cache = FilesystemDatasetCache::new(&dir, FakeSource::serving(""));
        let err = cache.fetch(&spec(Some("abc"))).expect_err("empty");
        assert!(err.is_recoverable());
        assert!(!cache.path_for(&spec(None)).exists());
        assert!(!dir.join("merged_crypto.csv.part").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn transport_failure_surfaces_dataset_name() {
        let dir = unique_tmp_path("cache_fail");
        let cache = FilesystemDatasetCache::new(&dir, FakeSource::failing("connection reset"));
        let err = cache.fetch(&spec(Some("abc"))).expect_err("fail");
        assert_eq!(err.kind(), "fetch");
        assert_eq!(err.dataset(), "sentiment");
        assert!(err.to_string().contains("connection reset"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_token_without_snapshot_is_a_fetch_error() {
        let dir = unique_tmp_path("cache_no_token");
        let cache = FilesystemDatasetCache::new(&dir, FakeSource::serving("x"));
        let err = cache.fetch(&spec(None)).expect_err("no token");
        assert!(err.is_recoverable());
        assert_eq!(cache.source.calls.get(), 0);
    }

    #[test]
    fn invalidate_forces_a_fresh_download() {
        let dir = unique_tmp_path("cache_refresh");
        let cache = FilesystemDatasetCache::new(&dir, FakeSource::serving("v1"));
        let first = cache.fetch(&spec(Some("abc"))).expect("fetch");

        *cache.source.payload.borrow_mut() = b"v2".to_vec();
        assert!(cache.invalidate(&spec(Some("abc"))).expect("invalidate"));
        assert!(!cache.invalidate(&spec(Some("abc"))).expect("second invalidate"));

        let refreshed = cache.fetch(&spec(Some("abc"))).expect("refetch");
        assert!(refreshed.downloaded);
        assert_ne!(refreshed.fingerprint, first.fingerprint);
        assert_eq!(cache.source.calls.get(), 2);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn hex_is_truncated_to_requested_width() {
        assert_eq!(to_hex_short(&[0xab, 0xcd, 0xef], 5), "abcde");
        assert_eq!(to_hex_short(&[0x01], 12), "01");
    }
}
