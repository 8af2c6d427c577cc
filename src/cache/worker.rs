//! Cache lifecycle and request interception.
//!
//! [`AssetCache`] owns the logic; [`AssetCacheHandle::spawn`] moves it onto
//! its own task so callers only ever talk to it through messages.

use std::sync::Arc;

use futures_util::future::try_join_all;
use reqwest::{Method, Url};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::CacheError;
use super::manifest::CacheManifest;
use super::network::{AssetRequest, Network};
use super::storage::{CacheStorage, CachedResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { assets: usize },
    AlreadyInstalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// Served from the active cache.
    Cache,
    /// Cache miss, fetched from the network.
    Network,
    /// Not intercepted at all.
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub response: CachedResponse,
    pub source: FetchSource,
}

#[derive(Clone)]
pub struct AssetCache {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    manifest: CacheManifest,
    active: Option<String>,
}

impl AssetCache {
    /// Opens the cache, picking up whatever generation is already on disk.
    ///
    /// If the current version is the only cache present it is active.
    /// Otherwise the newest earlier generation stays active until the
    /// current one is installed and activated. See [`previous_generation`].
    pub async fn open(
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        manifest: CacheManifest,
    ) -> Result<Self, CacheError> {
        let keys = storage.keys().await?;
        let active = if keys.len() == 1 && keys[0] == manifest.version {
            Some(manifest.version.clone())
        } else {
            previous_generation(&manifest.version, &keys)
        };
        debug!(version = %manifest.version, active = ?active, "Opened asset cache");

        Ok(Self {
            storage,
            network,
            manifest,
            active,
        })
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Fetch and store every manifest asset under the current version.
    ///
    /// All-or-nothing: if any asset fails, nothing is written and the
    /// previously active cache is untouched.
    pub async fn install(&self) -> Result<InstallOutcome, CacheError> {
        let version = &self.manifest.version;
        if self.storage.has(version).await? {
            debug!(%version, "Cache already installed");
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        let urls = self.manifest.asset_urls()?;
        let fetches = urls.iter().map(|url| self.fetch_asset(url));
        let entries = try_join_all(fetches).await?;
        let assets = entries.len();

        self.storage.commit(version, entries).await?;
        info!(%version, assets, "Installed asset cache");
        Ok(InstallOutcome::Installed { assets })
    }

    async fn fetch_asset(&self, url: &Url) -> Result<(String, CachedResponse), CacheError> {
        let response = self.network.fetch(&AssetRequest::get(url.as_str())).await?;
        if !response.is_success() {
            return Err(CacheError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok((url.to_string(), response))
    }

    /// Make the current version active and delete every other generation.
    ///
    /// Returns the names of the deleted caches.
    pub async fn activate(&mut self) -> Result<Vec<String>, CacheError> {
        let version = self.manifest.version.clone();
        if !self.storage.has(&version).await? {
            return Err(CacheError::NotInstalled(version));
        }

        let mut deleted = Vec::new();
        for key in self.storage.keys().await? {
            if key != version && self.storage.delete(&key).await? {
                info!(cache = %key, "Deleted stale cache");
                deleted.push(key);
            }
        }

        self.active = Some(version);
        Ok(deleted)
    }

    /// Install then activate. Failures are logged and swallowed; the stale
    /// cache keeps serving until the next attempt.
    pub async fn start(&mut self) -> bool {
        let result = match self.install().await {
            Ok(_) => self.activate().await.map(|_| ()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    code = e.code(),
                    version = %self.manifest.version,
                    error = %e,
                    "Asset cache not updated"
                );
                false
            }
        }
    }

    /// The cache key for `request`, or `None` if it goes straight to the network.
    fn intercepts(&self, request: &AssetRequest) -> Option<Url> {
        if request.method != Method::GET || self.manifest.is_bypassed(&request.url) {
            return None;
        }
        let url = self.manifest.resolve(&request.url).ok()?;
        (self.manifest.is_same_origin(&url) || self.manifest.lists(&url)).then_some(url)
    }

    pub async fn fetch(&self, request: &AssetRequest) -> Result<Fetched, CacheError> {
        let Some(url) = self.intercepts(request) else {
            let response = self.network.fetch(request).await?;
            return Ok(Fetched {
                response,
                source: FetchSource::Passthrough,
            });
        };

        let key = url.as_str();
        if let Some(cache) = &self.active {
            if let Some(response) = self.storage.lookup(cache, &key).await? {
                debug!(url = %key, "Cache hit");
                return Ok(Fetched {
                    response,
                    source: FetchSource::Cache,
                });
            }
        }

        let resolved = AssetRequest::new(request.method.clone(), key);
        let response = self.network.fetch(&resolved).await?;
        if let (Some(cache), true) = (&self.active, response.is_success()) {
            if let Err(e) = self.storage.put(cache, key, response.clone()).await {
                warn!(url = %key, error = %e, "Failed to store response");
            }
        }

        Ok(Fetched {
            response,
            source: FetchSource::Network,
        })
    }

    /// Every cache name in storage, with the active one flagged.
    pub async fn list(&self) -> Result<Vec<(String, bool)>, CacheError> {
        let keys = self.storage.keys().await?;
        Ok(keys
            .into_iter()
            .map(|k| {
                let active = self.active.as_deref() == Some(k.as_str());
                (k, active)
            })
            .collect())
    }
}

/// Split a cache name into its prefix and trailing generation number.
fn split_generation(name: &str) -> (&str, Option<u64>) {
    let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
    (prefix, name[prefix.len()..].parse().ok())
}

/// The highest-numbered earlier generation of `version` among `keys`.
///
/// Only names sharing the version's prefix count, compared numerically, so
/// `app-v10` outranks `app-v9` and an unrelated cache is never picked.
/// Names that are not numbered fall back to plain string order.
fn previous_generation(version: &str, keys: &[String]) -> Option<String> {
    let (prefix, _) = split_generation(version);
    keys.iter()
        .filter(|k| k.as_str() != version && k.starts_with(prefix))
        .max_by(|a, b| {
            let (_, a_gen) = split_generation(a);
            let (_, b_gen) = split_generation(b);
            a_gen.cmp(&b_gen).then_with(|| a.cmp(b))
        })
        .cloned()
}

enum Command {
    Install(oneshot::Sender<Result<InstallOutcome, CacheError>>),
    Activate(oneshot::Sender<Result<Vec<String>, CacheError>>),
    Start(oneshot::Sender<bool>),
    Fetch(AssetRequest, oneshot::Sender<Result<Fetched, CacheError>>),
    List(oneshot::Sender<Result<Vec<(String, bool)>, CacheError>>),
}

/// Cloneable handle to a cache running on its own task.
///
/// The worker stops once every handle is dropped.
#[derive(Clone)]
pub struct AssetCacheHandle {
    tx: mpsc::Sender<Command>,
}

impl AssetCacheHandle {
    pub fn spawn(cache: AssetCache) -> Self {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(run_worker(cache, rx));
        Self { tx }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, CacheError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| CacheError::WorkerStopped)?;
        reply_rx.await.map_err(|_| CacheError::WorkerStopped)
    }

    pub async fn install(&self) -> Result<InstallOutcome, CacheError> {
        self.request(Command::Install).await?
    }

    pub async fn activate(&self) -> Result<Vec<String>, CacheError> {
        self.request(Command::Activate).await?
    }

    /// Install then activate; returns whether both succeeded.
    pub async fn start(&self) -> Result<bool, CacheError> {
        self.request(Command::Start).await
    }

    pub async fn fetch(&self, request: AssetRequest) -> Result<Fetched, CacheError> {
        self.request(|reply| Command::Fetch(request, reply)).await?
    }

    pub async fn list(&self) -> Result<Vec<(String, bool)>, CacheError> {
        self.request(Command::List).await?
    }
}

async fn run_worker(mut cache: AssetCache, mut rx: mpsc::Receiver<Command>) {
    debug!(version = %cache.manifest.version, "Asset cache worker started");

    while let Some(command) = rx.recv().await {
        // A dropped reply receiver just means the caller gave up waiting.
        match command {
            Command::Install(reply) => {
                let _ = reply.send(cache.install().await);
            }
            Command::Activate(reply) => {
                let _ = reply.send(cache.activate().await);
            }
            Command::Start(reply) => {
                let _ = reply.send(cache.start().await);
            }
            // Fetches run on their own task so a slow asset never holds up
            // the command loop. Each works on a snapshot of the active cache.
            Command::Fetch(request, reply) => {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let result = cache.fetch(&request).await;
                    if let Err(e) = &result {
                        error!(url = %request.url, error = %e, "Asset fetch failed");
                    }
                    let _ = reply.send(result);
                });
            }
            Command::List(reply) => {
                let _ = reply.send(cache.list().await);
            }
        }
    }

    debug!("Asset cache worker stopped");
}
