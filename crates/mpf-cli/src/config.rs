//! Driver configuration
//!
//! Loaded from an optional TOML file, then overridden by command-line flags:
//!
//! ```toml
//! [registry]
//! base_url = "http://127.0.0.1:8088"
//! timeout_secs = 10
//! # fixture = "tables.json"
//!
//! [resolver]
//! schema_backed_shape = "primary_key"
//! table_cache_ttl_secs = 60
//!
//! [resolver.logical_kinds]
//! SAVED_QUERY = "query_name"
//! ```

use anyhow::Context;
use mpf_schema::{HttpRegistryConfig, HttpSchemaRegistry, ResolverConfig, SchemaRegistry, StaticSchemaRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where table layouts come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Registry origin
    pub base_url: String,
    /// Transport timeout
    pub timeout_secs: Option<u64>,
    /// JSON fixture used instead of the HTTP registry
    pub fixture: Option<PathBuf>,
}

impl RegistrySettings {
    /// HTTP client settings
    #[must_use]
    pub fn http(&self) -> HttpRegistryConfig {
        let config = HttpRegistryConfig::new(self.base_url.clone());
        match self.timeout_secs {
            Some(secs) => config.with_timeout_secs(secs),
            None => config,
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            base_url: HttpRegistryConfig::default().base_url,
            timeout_secs: Some(10),
            fixture: None,
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Registry connection
    pub registry: RegistrySettings,
    /// Type classification and resolution
    pub resolver: ResolverConfig,
}

impl CliConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// If the text is not valid TOML for this layout
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// If the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load `path` if given, defaults otherwise
    ///
    /// # Errors
    /// As [`load`](Self::load)
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// With registry origin; clears any fixture
    #[must_use]
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry.base_url = url.into();
        self.registry.fixture = None;
        self
    }

    /// With registry fixture file
    #[must_use]
    pub fn with_registry_fixture(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry.fixture = Some(path.into());
        self
    }

    /// Build the configured registry; a fixture takes precedence over HTTP
    ///
    /// # Errors
    /// If the fixture cannot be loaded or the base URL is invalid
    pub fn build_registry(&self) -> anyhow::Result<Arc<dyn SchemaRegistry>> {
        if let Some(path) = &self.registry.fixture {
            let registry = StaticSchemaRegistry::load(path)
                .with_context(|| format!("loading registry fixture {}", path.display()))?;
            tracing::info!(fixture = %path.display(), tables = registry.len(), "using fixture registry");
            return Ok(Arc::new(registry));
        }

        let registry = HttpSchemaRegistry::new(&self.registry.http())
            .with_context(|| format!("registry url {}", self.registry.base_url))?;
        tracing::info!(url = %registry.base_url(), "using http registry");
        Ok(Arc::new(registry))
    }
}
