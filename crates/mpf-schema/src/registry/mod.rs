//! Schema registry boundary
//!
//! The registry is an external, read-only collaborator. This module defines
//! its wire payloads and the [`SchemaRegistry`] seam, with two implementations:
//! - [`HttpSchemaRegistry`]: the `/api/schema/*` endpoints over HTTP
//! - [`StaticSchemaRegistry`]: in-memory tables, optionally loaded from a JSON fixture

use crate::error::RegistryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod http;
mod memory;

pub use http::{HttpRegistryConfig, HttpSchemaRegistry};
pub use memory::{StaticSchemaRegistry, TableFixture};

/// `GET /api/schema/tables`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TablesResponse {
    /// Every schema-backed type token the registry can resolve
    #[serde(default)]
    pub tables: Vec<String>,
}

/// `GET /api/schema/{table}/fields`
///
/// `sections` is kept undecoded so the resolver can tell a missing layout
/// from a malformed one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldsResponse {
    /// Section name → field descriptors (raw)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Value>,
    /// Present when the registry refuses the table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One primary-key entry; the registry sends either a bare name or an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKeyColumn {
    /// `"ORDER_RELEASE_GID"`
    Name(String),
    /// `{"columnName": "ORDER_RELEASE_GID"}`
    Column {
        /// Column name
        #[serde(rename = "columnName")]
        column_name: String,
    },
}

impl PrimaryKeyColumn {
    /// Column name regardless of encoding
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Column { column_name: name } => name,
        }
    }
}

/// `GET /api/schema/{table}/raw`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSchemaResponse {
    /// Ordered primary-key columns
    #[serde(rename = "primaryKey", default)]
    pub primary_key: Vec<PrimaryKeyColumn>,
}

/// Read-only access to the schema registry
///
/// Implementations report transport and lookup failures as [`RegistryError`];
/// interpreting payloads (missing layout, empty key) is the resolver's job.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// List every resolvable table
    async fn list_tables(&self) -> Result<TablesResponse, RegistryError>;

    /// Field layout for a table
    async fn fields(&self, table: &str) -> Result<FieldsResponse, RegistryError>;

    /// Raw schema (primary key) for a table
    async fn raw(&self, table: &str) -> Result<RawSchemaResponse, RegistryError>;
}
