use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::CacheError;

/// Bumping this is the only way to invalidate installed caches.
pub const DEFAULT_CACHE_VERSION: &str = "scripture-quiz-v2";
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";

/// Shell assets needed to render without network access.
pub const SHELL_ASSETS: [&str; 6] = [
    "/",
    "/index.html",
    "/manifest.json",
    "/index.js",
    "https://cdn.tailwindcss.com",
    "https://fonts.googleapis.com/css2?family=EB+Garamond:wght@400;700&family=Inter:wght@400;500;700&display=swap",
];

/// Requests whose URL contains one of these always go to the network.
pub const DEFAULT_BYPASS: [&str; 1] = ["generativelanguage"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: String,
    /// Base for relative asset URLs and the same-origin check.
    pub origin: String,
    pub assets: Vec<String>,
    #[serde(default)]
    pub bypass: Vec<String>,
}

impl CacheManifest {
    pub fn new(version: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            origin: origin.into(),
            assets: SHELL_ASSETS.iter().map(|s| s.to_string()).collect(),
            bypass: DEFAULT_BYPASS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn base(&self) -> Result<Url, CacheError> {
        Url::parse(&self.origin).map_err(|e| CacheError::InvalidUrl {
            url: self.origin.clone(),
            reason: e.to_string(),
        })
    }

    /// Normalized absolute form of `url`, which is also its cache key.
    ///
    /// Relative and protocol-relative references are joined onto the
    /// origin. Fragments never reach the server, so they are dropped.
    pub fn resolve(&self, url: &str) -> Result<Url, CacheError> {
        let mut resolved = self.base()?.join(url).map_err(|e| CacheError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        resolved.set_fragment(None);
        Ok(resolved)
    }

    pub fn asset_urls(&self) -> Result<Vec<Url>, CacheError> {
        self.assets.iter().map(|a| self.resolve(a)).collect()
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        self.base().is_ok_and(|base| base.origin() == url.origin())
    }

    pub fn lists(&self, url: &Url) -> bool {
        self.assets
            .iter()
            .any(|a| self.resolve(a).is_ok_and(|asset| asset == *url))
    }

    pub fn is_bypassed(&self, url: &str) -> bool {
        self.bypass.iter().any(|pattern| url.contains(pattern.as_str()))
    }
}
