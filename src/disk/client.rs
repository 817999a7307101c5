//! HTTP client for the Yandex Disk public-resources API.
//!
//! One [`YandexDiskClient`] is built at startup and shared by every request so
//! connections to the provider and its download hosts are pooled.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DiskError;
use super::record::{FileRecord, ListingResponse};
use super::DiskApi;
use crate::user_agent;

/// Public-resources listing endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://cloud-api.yandex.net/v1/disk/public/resources";

/// Default HTTP connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP request timeout (5 minutes, downloads are buffered in memory).
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

/// Construction settings for [`YandexDiskClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Listing endpoint; overridden in tests to point at a mock server.
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

/// Remote disk client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct YandexDiskClient {
    client: Client,
    base_url: String,
}

impl YandexDiskClient {
    /// Creates a client for the public Yandex API with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`DiskError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, DiskError> {
        Self::with_settings(ClientSettings::default())
    }

    /// Creates a client with explicit endpoint and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`DiskError::ClientBuild`] if the HTTP client cannot be built.
    #[instrument(level = "debug", skip_all, fields(base_url = %settings.base_url))]
    pub fn with_settings(settings: ClientSettings) -> Result<Self, DiskError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| DiskError::ClientBuild { source })?;
        debug!("disk client ready");
        Ok(Self {
            client,
            base_url: settings.base_url,
        })
    }

    /// Returns the listing endpoint this client calls.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn listing_url(&self, public_key: &str, path: &str) -> Result<Url, DiskError> {
        let mut params = vec![("public_key", public_key)];
        if !path.is_empty() {
            params.push(("path", path));
        }
        Url::parse_with_params(&self.base_url, &params)
            .map_err(|_| DiskError::invalid_url(self.base_url.clone()))
    }

    async fn fetch_listing(
        &self,
        public_key: &str,
        path: &str,
    ) -> Result<Vec<FileRecord>, DiskError> {
        let url = self.listing_url(public_key, path)?;
        debug!(api_url = %url, "calling listing endpoint");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DiskError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiskError::http_status(url.as_str(), status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DiskError::network(url.as_str(), e))?;
        let parsed: ListingResponse = serde_json::from_slice(&body)
            .map_err(|e| DiskError::malformed_body(url.as_str(), e.to_string()))?;
        let Some(embedded) = parsed.embedded else {
            return Err(DiskError::malformed_body(
                url.as_str(),
                "response has no _embedded items",
            ));
        };

        Ok(embedded
            .items
            .into_iter()
            .map(|item| FileRecord::from_item(item, public_key))
            .collect())
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, DiskError> {
        let parsed = Url::parse(url).map_err(|_| DiskError::invalid_url(url))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DiskError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiskError::http_status(url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DiskError::network(url, e))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DiskApi for YandexDiskClient {
    #[instrument(skip(self), fields(public_key = %public_key, path = %path))]
    async fn list_files(&self, public_key: &str, path: &str) -> Result<Vec<FileRecord>, DiskError> {
        match self.fetch_listing(public_key, path).await {
            Ok(records) => {
                info!(entries = records.len(), "listing retrieved");
                Ok(records)
            }
            Err(error) => {
                debug!(error = %error, "listing unavailable");
                Err(error)
            }
        }
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn download_file(&self, url: &str) -> Result<Vec<u8>, DiskError> {
        match self.fetch_bytes(url).await {
            Ok(bytes) => {
                info!(bytes = bytes.len(), "download complete");
                Ok(bytes)
            }
            Err(error) => {
                debug!(error = %error, "download failed");
                Err(error)
            }
        }
    }
}
