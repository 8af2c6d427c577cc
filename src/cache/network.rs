use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;

use super::CacheError;
use super::storage::CachedResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub method: Method,
    pub url: String,
}

impl AssetRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
        }
    }

    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }
}

/// Where asset responses come from when the cache cannot answer.
#[async_trait]
pub trait Network: Send + Sync {
    /// Any status counts as a response; only transport failures are errors.
    async fn fetch(&self, request: &AssetRequest) -> Result<CachedResponse, CacheError>;
}

pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<CachedResponse, CacheError> {
        let network_error = |e: reqwest::Error| CacheError::Network {
            url: request.url.clone(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .request(request.method.clone(), &request.url)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(network_error)?.to_vec();

        Ok(CachedResponse {
            status,
            content_type,
            body,
        })
    }
}
