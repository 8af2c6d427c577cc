//! Named cache generations.
//!
//! A storage holds any number of named caches, each mapping a request URL
//! to a stored response. `commit` creates a whole cache at once: after it
//! returns the cache exists fully populated, and if it fails the name does
//! not exist at all.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::CacheError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Names of all caches, sorted.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    async fn has(&self, cache: &str) -> Result<bool, CacheError>;

    /// Create `cache` holding exactly `entries`, replacing any previous content.
    async fn commit(
        &self,
        cache: &str,
        entries: Vec<(String, CachedResponse)>,
    ) -> Result<(), CacheError>;

    /// Add or replace one entry in an existing cache.
    async fn put(&self, cache: &str, key: &str, response: CachedResponse)
    -> Result<(), CacheError>;

    async fn lookup(&self, cache: &str, key: &str) -> Result<Option<CachedResponse>, CacheError>;

    /// Returns whether the cache existed.
    async fn delete(&self, cache: &str) -> Result<bool, CacheError>;
}

pub fn validate_name(name: &str) -> Result<(), CacheError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidName(name.to_string()))
    }
}

type Entries = HashMap<String, CachedResponse>;

/// Caches kept in process memory.
#[derive(Default)]
pub struct MemoryStorage {
    caches: RwLock<BTreeMap<String, Entries>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.caches.read().await.keys().cloned().collect())
    }

    async fn has(&self, cache: &str) -> Result<bool, CacheError> {
        Ok(self.caches.read().await.contains_key(cache))
    }

    async fn commit(
        &self,
        cache: &str,
        entries: Vec<(String, CachedResponse)>,
    ) -> Result<(), CacheError> {
        validate_name(cache)?;
        let entries: Entries = entries.into_iter().collect();
        self.caches.write().await.insert(cache.to_string(), entries);
        Ok(())
    }

    async fn put(
        &self,
        cache: &str,
        key: &str,
        response: CachedResponse,
    ) -> Result<(), CacheError> {
        let mut caches = self.caches.write().await;
        let entries = caches
            .get_mut(cache)
            .ok_or_else(|| CacheError::NotInstalled(cache.to_string()))?;
        entries.insert(key.to_string(), response);
        Ok(())
    }

    async fn lookup(&self, cache: &str, key: &str) -> Result<Option<CachedResponse>, CacheError> {
        Ok(self
            .caches
            .read()
            .await
            .get(cache)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn delete(&self, cache: &str) -> Result<bool, CacheError> {
        Ok(self.caches.write().await.remove(cache).is_some())
    }
}

const INDEX_FILE: &str = "index.json";
const STAGING_SUFFIX: &str = ".staging";

#[derive(Debug, Default, Serialize, Deserialize)]
struct DiskIndex {
    next_id: u64,
    entries: BTreeMap<String, DiskEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DiskEntry {
    file: String,
    #[serde(flatten)]
    response: CachedResponse,
}

/// Caches kept on disk, one directory per cache name.
///
/// Layout: `<root>/<cache>/index.json` plus one `<n>.body` file per entry.
pub struct DiskStorage {
    root: PathBuf,
    /// Serializes index rewrites.
    write_lock: tokio::sync::Mutex<()>,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn cache_dir(&self, cache: &str) -> Result<PathBuf, CacheError> {
        validate_name(cache)?;
        Ok(self.root.join(cache))
    }

    async fn read_index(dir: &Path) -> Result<DiskIndex, CacheError> {
        let path = dir.join(INDEX_FILE);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| CacheError::io(&path, source))?;
        serde_json::from_str(&text).map_err(|e| CacheError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write the index through a temporary file so readers never see half of it.
    async fn write_index(dir: &Path, index: &DiskIndex) -> Result<(), CacheError> {
        let path = dir.join(INDEX_FILE);
        let tmp = dir.join(format!("{INDEX_FILE}.tmp"));
        let text = serde_json::to_string_pretty(index).map_err(|e| CacheError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&tmp, text)
            .await
            .map_err(|source| CacheError::io(&tmp, source))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| CacheError::io(&path, source))
    }

    async fn write_body(dir: &Path, file: &str, body: &[u8]) -> Result<(), CacheError> {
        let path = dir.join(file);
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| CacheError::io(&path, source))
    }

    async fn populate(dir: &Path, entries: Vec<(String, CachedResponse)>) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| CacheError::io(dir, source))?;

        let mut index = DiskIndex::default();
        for (key, response) in entries {
            let file = format!("{}.body", index.next_id);
            index.next_id += 1;
            Self::write_body(dir, &file, &response.body).await?;
            index.entries.insert(key, DiskEntry { file, response });
        }
        Self::write_index(dir, &index).await
    }

    async fn has_index(dir: &Path) -> Result<bool, CacheError> {
        let path = dir.join(INDEX_FILE);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|source| CacheError::io(&path, source))
    }

    async fn remove_dir_if_exists(dir: &Path) -> Result<bool, CacheError> {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::io(dir, source)),
        }
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(CacheError::io(&self.root, source)),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|source| CacheError::io(&self.root, source))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(STAGING_SUFFIX) || validate_name(&name).is_err() {
                continue;
            }
            if Self::has_index(&entry.path()).await? {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn has(&self, cache: &str) -> Result<bool, CacheError> {
        Self::has_index(&self.cache_dir(cache)?).await
    }

    async fn commit(
        &self,
        cache: &str,
        entries: Vec<(String, CachedResponse)>,
    ) -> Result<(), CacheError> {
        let target = self.cache_dir(cache)?;
        let staging = self.root.join(format!("{cache}{STAGING_SUFFIX}"));
        let _guard = self.write_lock.lock().await;

        Self::remove_dir_if_exists(&staging).await?;
        if let Err(e) = Self::populate(&staging, entries).await {
            let _ = Self::remove_dir_if_exists(&staging).await;
            return Err(e);
        }

        Self::remove_dir_if_exists(&target).await?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(|source| CacheError::io(&target, source))
    }

    async fn put(
        &self,
        cache: &str,
        key: &str,
        response: CachedResponse,
    ) -> Result<(), CacheError> {
        let dir = self.cache_dir(cache)?;
        let _guard = self.write_lock.lock().await;

        if !Self::has_index(&dir).await? {
            return Err(CacheError::NotInstalled(cache.to_string()));
        }

        let mut index = Self::read_index(&dir).await?;
        let file = match index.entries.get(key) {
            Some(existing) => existing.file.clone(),
            None => {
                let file = format!("{}.body", index.next_id);
                index.next_id += 1;
                file
            }
        };

        Self::write_body(&dir, &file, &response.body).await?;
        index
            .entries
            .insert(key.to_string(), DiskEntry { file, response });
        Self::write_index(&dir, &index).await
    }

    async fn lookup(&self, cache: &str, key: &str) -> Result<Option<CachedResponse>, CacheError> {
        let dir = self.cache_dir(cache)?;
        if !Self::has_index(&dir).await? {
            return Ok(None);
        }

        let index = Self::read_index(&dir).await?;
        let Some(entry) = index.entries.get(key) else {
            return Ok(None);
        };

        let path = dir.join(&entry.file);
        let body = tokio::fs::read(&path)
            .await
            .map_err(|source| CacheError::io(&path, source))?;

        Ok(Some(CachedResponse {
            body,
            ..entry.response.clone()
        }))
    }

    async fn delete(&self, cache: &str) -> Result<bool, CacheError> {
        let dir = self.cache_dir(cache)?;
        let _guard = self.write_lock.lock().await;
        Self::remove_dir_if_exists(&dir).await
    }
}
