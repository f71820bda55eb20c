//! In-memory schema registry
//!
//! Serves tables from a fixed map. Table names are matched case-insensitively
//! (stored upper-case), as the registry service does.

use super::{FieldsResponse, PrimaryKeyColumn, RawSchemaResponse, SchemaRegistry, TablesResponse};
use crate::error::RegistryError;
use crate::field::SchemaDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Registry-side description of one table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableFixture {
    /// Raw `/fields` sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Value>,
    /// Raw `/raw` primary key
    #[serde(rename = "primaryKey", default)]
    pub primary_key: Vec<PrimaryKeyColumn>,
    /// Error reported by `/fields` instead of a layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableFixture {
    /// Fixture serving a well-formed layout
    #[must_use]
    pub fn from_schema(schema: &SchemaDescriptor) -> Self {
        Self {
            sections: serde_json::to_value(&schema.sections).ok(),
            primary_key: Vec::new(),
            error: None,
        }
    }

    /// With primary-key columns
    #[must_use]
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns
            .into_iter()
            .map(|c| PrimaryKeyColumn::Name(c.into()))
            .collect();
        self
    }

    /// With arbitrary (possibly malformed) sections payload
    #[inline]
    #[must_use]
    pub fn with_raw_sections(mut self, sections: Value) -> Self {
        self.sections = Some(sections);
        self
    }

    /// With `/fields` error
    #[inline]
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    tables: BTreeMap<String, TableFixture>,
}

/// Registry backed by an in-memory table map
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaRegistry {
    tables: BTreeMap<String, TableFixture>,
}

impl StaticSchemaRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table
    pub fn insert(&mut self, table: &str, fixture: TableFixture) {
        self.tables.insert(table.to_ascii_uppercase(), fixture);
    }

    /// Register a table (builder style)
    #[must_use]
    pub fn with_table(mut self, table: &str, fixture: TableFixture) -> Self {
        self.insert(table, fixture);
        self
    }

    /// Parse a fixture document: `{"tables": {"NAME": {"sections": …, "primaryKey": […]}}}`
    ///
    /// # Errors
    /// `RegistryError::InvalidResponse` if the document does not decode
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let file: FixtureFile = serde_json::from_str(json)
            .map_err(|e| RegistryError::InvalidResponse(format!("fixture: {e}")))?;
        let mut registry = Self::new();
        for (name, fixture) in file.tables {
            registry.insert(&name, fixture);
        }
        Ok(registry)
    }

    /// Load a fixture document from disk
    ///
    /// # Errors
    /// `RegistryError::Unreachable` if the file cannot be read,
    /// `RegistryError::InvalidResponse` if it does not decode
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Unreachable(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Number of registered tables
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no tables are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn table(&self, table: &str) -> Result<&TableFixture, RegistryError> {
        self.tables
            .get(&table.to_ascii_uppercase())
            .ok_or_else(|| RegistryError::not_found(table))
    }
}

#[async_trait]
impl SchemaRegistry for StaticSchemaRegistry {
    async fn list_tables(&self) -> Result<TablesResponse, RegistryError> {
        Ok(TablesResponse {
            tables: self.tables.keys().cloned().collect(),
        })
    }

    async fn fields(&self, table: &str) -> Result<FieldsResponse, RegistryError> {
        let fixture = self.table(table)?;
        Ok(FieldsResponse {
            sections: fixture.sections.clone(),
            error: fixture.error.clone(),
        })
    }

    async fn raw(&self, table: &str) -> Result<RawSchemaResponse, RegistryError> {
        let fixture = self.table(table)?;
        Ok(RawSchemaResponse {
            primary_key: fixture.primary_key.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;

    fn registry() -> StaticSchemaRegistry {
        let schema = SchemaDescriptor::default()
            .with_section("CORE", vec![FieldDescriptor::new("LOCATION_GID")]);
        StaticSchemaRegistry::new()
            .with_table("location", TableFixture::from_schema(&schema).with_primary_key(["LOCATION_GID"]))
    }

    #[tokio::test]
    async fn lookups_ignore_case() {
        let registry = registry();
        assert!(registry.fields("LOCATION").await.is_ok());
        assert!(registry.fields("Location").await.is_ok());
        assert_eq!(registry.raw("location").await.unwrap().primary_key.len(), 1);
    }

    #[tokio::test]
    async fn unknown_table_is_not_found() {
        let err = registry().fields("SHIPMENT").await.unwrap_err();
        assert_eq!(err, RegistryError::not_found("SHIPMENT"));
    }

    #[tokio::test]
    async fn lists_tables_sorted() {
        let registry = registry().with_table("agent_event", TableFixture::default());
        let tables = registry.list_tables().await.unwrap().tables;
        assert_eq!(tables, vec!["AGENT_EVENT", "LOCATION"]);
    }

    #[test]
    fn parses_fixture_document() {
        let registry = StaticSchemaRegistry::from_json_str(
            r#"{"tables": {"RATE_GEO": {"sections": {"CORE": [{"name": "RATE_GEO_GID"}]}, "primaryKey": [{"columnName": "RATE_GEO_GID"}]}}}"#,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_garbled_fixture() {
        assert!(StaticSchemaRegistry::from_json_str("{tables: ").is_err());
    }
}
