use crate::errors::DatasetError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One remotely hosted dataset and where its local snapshot lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSpec {
    pub name: String,
    pub token: Option<String>,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedDataset {
    pub path: PathBuf,
    pub bytes: u64,
    pub fingerprint: String,
    pub downloaded: bool,
}

/// Transport for a file identified by an opaque token.
pub trait RemoteFileSource {
    fn download(&self, token: &str, dest: &Path) -> Result<u64, String>;
}

/// Cache-aside access to dataset snapshots.
pub trait DatasetCache {
    fn fetch(&self, spec: &DatasetSpec) -> Result<CachedDataset, DatasetError>;
    /// Returns whether a cached file was removed.
    fn invalidate(&self, spec: &DatasetSpec) -> Result<bool, DatasetError>;
}
