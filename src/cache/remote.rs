//! Remote Backend Module
//!
//! [`CacheBackend`] over HTTP against the `/store` endpoints of a running
//! kiosk_cache service, so that every application process shares one store.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::cache::{CacheBackend, CacheStats};
use crate::error::{CacheError, Result};
use crate::models::{
    ErrorResponse, GetResponse, KeysResponse, PatternQuery, RemovedResponse, SetRequest,
};

/// Client side of the store endpoints.
///
/// Request timeouts are left to the adapter, which bounds every call.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: Client,
    base: Url,
}

impl RemoteBackend {
    /// `base_url` is the service root, e.g. `http://cache.internal:3000`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| CacheError::InvalidRequest(format!("bad base url {:?}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(CacheError::InvalidRequest(format!(
                "{} cannot be a base url",
                base_url
            )));
        }
        Ok(Self { client, base })
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CacheError::InvalidRequest(format!("{} cannot be a base url", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn key_url(&self, key: &str) -> Result<Url> {
        self.url(&["store", "keys", key])
    }

    fn pattern_query(pattern: &str) -> PatternQuery {
        PatternQuery {
            pattern: pattern.to_string(),
        }
    }
}

fn unreachable_store(e: reqwest::Error) -> CacheError {
    CacheError::BackendUnavailable(e.to_string())
}

/// Maps a non-success reply back onto the error the service raised.
async fn rejected(response: Response) -> CacheError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    match status {
        StatusCode::BAD_REQUEST => CacheError::InvalidRequest(message),
        _ => CacheError::BackendUnavailable(format!("{}: {}", status, message)),
    }
}

async fn expect_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(rejected(response).await)
    }
}

#[async_trait]
impl CacheBackend for RemoteBackend {
    fn enumerates_keys(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.key_url(key)?)
            .send()
            .await
            .map_err(unreachable_store)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: GetResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(unreachable_store)?;
        Ok(Some(body.value))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let request = SetRequest {
            value: value.to_string(),
            ttl: Some(ttl_seconds),
        };
        let response = self
            .client
            .put(self.key_url(key)?)
            .json(&request)
            .send()
            .await
            .map_err(unreachable_store)?;
        expect_success(response).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let response = self
            .client
            .delete(self.key_url(key)?)
            .send()
            .await
            .map_err(unreachable_store)?;
        let body: RemovedResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(unreachable_store)?;
        Ok(body.removed > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize> {
        let response = self
            .client
            .delete(self.url(&["store", "keys"])?)
            .query(&Self::pattern_query(pattern))
            .send()
            .await
            .map_err(unreachable_store)?;
        let body: RemovedResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(unreachable_store)?;
        Ok(body.removed)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url(&["store", "keys"])?)
            .query(&Self::pattern_query(pattern))
            .send()
            .await
            .map_err(unreachable_store)?;
        let body: KeysResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(unreachable_store)?;
        Ok(body.keys)
    }

    async fn stats(&self) -> Option<CacheStats> {
        let url = self.url(&["store", "stats"]).ok()?;
        let response = self.client.get(url).send().await.ok()?;
        expect_success(response).await.ok()?.json().await.ok()
    }
}
