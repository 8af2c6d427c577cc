//! Offline asset cache.
//!
//! Keeps a versioned copy of the app shell so it still loads without a
//! network connection. Generation requests to the content provider are
//! never cached.

mod manifest;
mod network;
mod storage;
mod worker;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use manifest::{
    CacheManifest, DEFAULT_BYPASS, DEFAULT_CACHE_VERSION, DEFAULT_ORIGIN, SHELL_ASSETS,
};
pub use network::{AssetRequest, HttpNetwork, Network};
pub use storage::{CacheStorage, CachedResponse, DiskStorage, MemoryStorage};
pub use worker::{AssetCache, AssetCacheHandle, FetchSource, Fetched, InstallOutcome};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache name: {0:?}")]
    InvalidName(String),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("cache {0} is not installed")]
    NotInstalled(String),

    #[error("failed to fetch {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("fetching {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("corrupt cache data at {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("cache worker has stopped")]
    WorkerStopped,
}

impl CacheError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CacheError::Network { .. }
            | CacheError::Status { .. }
            | CacheError::InvalidUrl { .. } => "CACHE_INSTALL_FAILURE",
            CacheError::NotInstalled(_) => "CACHE_NOT_INSTALLED",
            _ => "CACHE_STORAGE_FAILURE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let fetch = CacheError::Status {
            url: "http://quiz.test/".to_string(),
            status: 503,
        };
        assert_eq!(fetch.code(), "CACHE_INSTALL_FAILURE");
        assert_eq!(
            CacheError::NotInstalled("v1".to_string()).code(),
            "CACHE_NOT_INSTALLED"
        );
        assert_eq!(
            CacheError::InvalidName("../x".to_string()).code(),
            "CACHE_STORAGE_FAILURE"
        );
    }
}
