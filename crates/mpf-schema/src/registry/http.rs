//! HTTP schema registry client
//!
//! Talks to the page's same-origin registry service:
//! `/api/schema/tables`, `/api/schema/{table}/fields`, `/api/schema/{table}/raw`.

use super::{FieldsResponse, RawSchemaResponse, SchemaRegistry, TablesResponse};
use crate::error::RegistryError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for [`HttpSchemaRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRegistryConfig {
    /// Registry origin, e.g. `http://127.0.0.1:8088`
    pub base_url: String,
    /// Transport timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl HttpRegistryConfig {
    /// Create config for base URL
    #[inline]
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: None,
        }
    }

    /// With transport timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

impl Default for HttpRegistryConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8088")
    }
}

/// Schema registry reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpSchemaRegistry {
    client: Client,
    base_url: Url,
}

impl HttpSchemaRegistry {
    /// Create client for config
    ///
    /// # Errors
    /// `RegistryError::Unreachable` if the base URL is invalid or the client cannot be built
    pub fn new(config: &HttpRegistryConfig) -> Result<Self, RegistryError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            RegistryError::Unreachable(format!("invalid base url {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RegistryError::Unreachable(format!(
                "base url cannot carry a path: {}",
                config.base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| RegistryError::Unreachable(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Registry origin
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RegistryError::Unreachable(format!("base url cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        table: Option<&str>,
    ) -> Result<T, RegistryError> {
        tracing::debug!(%url, "registry request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RegistryError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(table) = table {
                return Err(RegistryError::not_found(table));
            }
        }
        if !status.is_success() {
            return Err(RegistryError::Unreachable(format!("status {status} from {url}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl SchemaRegistry for HttpSchemaRegistry {
    async fn list_tables(&self) -> Result<TablesResponse, RegistryError> {
        let url = self.endpoint(&["api", "schema", "tables"])?;
        self.get_json(url, None).await
    }

    async fn fields(&self, table: &str) -> Result<FieldsResponse, RegistryError> {
        let url = self.endpoint(&["api", "schema", table, "fields"])?;
        self.get_json(url, Some(table)).await
    }

    async fn raw(&self, table: &str) -> Result<RawSchemaResponse, RegistryError> {
        let url = self.endpoint(&["api", "schema", table, "raw"])?;
        self.get_json(url, Some(table)).await
    }
}
