//! Media catalog client
//!
//! Thin typed wrapper over an Overseerr-compatible API: search for titles and
//! file requests for them. The API key travels only in the `X-Api-Key`
//! header, so every URL this module hands out is safe to display.

mod error;
mod models;

pub use error::{CatalogError, CatalogResult};
pub use models::{MediaItem, MediaRequestSpec, MediaType};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use models::{ErrorBody, RequestBody, SearchEnvelope};

/// Path prefix of every catalog endpoint
pub const API_PREFIX: &str = "/api/v1";

const API_KEY_HEADER: &str = "X-Api-Key";

/// Port trait for catalog operations used by the tool executor
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Search titles, normalized and in server order
    async fn search(&self, query: &str) -> CatalogResult<Vec<MediaItem>>;

    /// File a request and return the server's confirmation payload
    async fn request_media(&self, spec: &MediaRequestSpec) -> CatalogResult<Value>;
}

/// HTTP implementation of [`CatalogPort`]
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Server root with trailing slashes removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// URL hit by [`Self::test_connection`], without performing the call.
    pub fn probe_url(&self) -> String {
        self.endpoint("/auth/me")
    }

    /// Authenticated GET against the probe URL.
    ///
    /// Returns `Ok(false)` when the server answers with a non-success status
    /// and `Err` when it cannot be reached at all.
    pub async fn test_connection(&self) -> CatalogResult<bool> {
        Ok(self.probe_status().await?.is_success())
    }

    /// Status the server answered the probe with
    pub async fn probe_status(&self) -> CatalogResult<StatusCode> {
        let url = self.probe_url();
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                warn!("Catalog connection test failed: {}", e);
                CatalogError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Catalog connection test returned {}", status);
        }
        Ok(status)
    }

    fn status_text(response: &Response) -> String {
        let status = response.status();
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string())
    }
}

#[async_trait]
impl CatalogPort for CatalogClient {
    async fn search(&self, query: &str) -> CatalogResult<Vec<MediaItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::Validation("query must not be empty".to_string()));
        }

        let url = format!(
            "{}?query={}",
            self.endpoint("/search"),
            urlencoding::encode(query)
        );
        debug!("Catalog search: {}", url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Transport(format!(
                "Search failed: {}",
                Self::status_text(&response)
            )));
        }

        let envelope: SearchEnvelope = response.json().await?;
        let total = envelope.results.len();
        let items: Vec<MediaItem> = envelope
            .results
            .into_iter()
            .filter_map(|entry| entry.into_media_item())
            .collect();

        if items.len() < total {
            debug!("Skipped {} non-title search entries", total - items.len());
        }

        Ok(items)
    }

    async fn request_media(&self, spec: &MediaRequestSpec) -> CatalogResult<Value> {
        let url = self.endpoint("/request");
        let body = RequestBody::from(spec);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let fallback = Self::status_text(&response);
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback);
            return Err(CatalogError::RequestRejected(message));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> CatalogConfig {
        CatalogConfig {
            url: url.to_string(),
            api_key: "secret-key".to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let client = CatalogClient::new(&config("http://overseerr.local:5055/"));
        assert_eq!(client.base_url(), "http://overseerr.local:5055");
        assert_eq!(client.probe_url(), "http://overseerr.local:5055/api/v1/auth/me");
    }

    #[test]
    fn test_probe_url_never_contains_key() {
        let client = CatalogClient::new(&config("http://overseerr.local:5055"));
        assert!(!client.probe_url().contains("secret-key"));
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_without_network() {
        let client = CatalogClient::new(&config("http://127.0.0.1:9"));
        let err = client.search("   ").await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        let client = CatalogClient::new(&config("http://127.0.0.1:9"));
        let err = client.test_connection().await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }
}
