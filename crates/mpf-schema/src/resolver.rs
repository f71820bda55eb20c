//! Object-type resolution
//!
//! [`SchemaResolver`] turns an object-type token into the field shape an
//! Object renders:
//! - logical kinds (a configured set) get one fixed identifier field
//! - every other non-empty token is a registry table, resolved over the
//!   [`SchemaRegistry`] seam into a field layout or a primary-key identifier set
//!
//! Resolution holds no per-object state, so it is re-entrant: two lookups for
//! the same token may overlap freely. Ordering between them is the caller's
//! concern (see the form crate's generation tags).

use crate::catalog::TableCatalog;
use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldDescriptor, SchemaDescriptor};
use crate::registry::SchemaRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Classification of an object-type token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    /// A registry table
    SchemaBacked(String),
    /// A logical construct with a fixed identifier field
    Logical(String),
    /// No type selected
    Unresolved,
}

impl Classification {
    /// Whether resolving this classification needs the registry
    #[inline]
    #[must_use]
    pub fn needs_registry(&self) -> bool {
        matches!(self, Self::SchemaBacked(_))
    }
}

/// Ordered logical kind → identifier field table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalKinds(IndexMap<String, String>);

impl LogicalKinds {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self(IndexMap::new())
    }

    /// Add a kind (builder style)
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>, identifier_field: impl Into<String>) -> Self {
        self.0.insert(kind.into(), identifier_field.into());
        self
    }

    /// Whether `kind` is a logical kind
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.0.contains_key(kind)
    }

    /// Identifier field for `kind`
    #[inline]
    #[must_use]
    pub fn identifier_field(&self, kind: &str) -> Option<&str> {
        self.0.get(kind).map(String::as_str)
    }

    /// Kinds in configured order
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of kinds
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no kinds are configured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LogicalKinds {
    fn default() -> Self {
        Self::empty()
            .with_kind("SAVED_QUERY", "query_name")
            .with_kind("AGENT", "agent_gid")
            .with_kind("FINDER_SET", "finder_set_gid")
            .with_kind("RATE", "rate_offering_gid")
            .with_kind("EVENT_GROUP", "event_group_gid")
    }
}

/// Which shape a registry table renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaBackedShape {
    /// Full field layout; values stored under `data`
    #[default]
    Data,
    /// One field per primary-key column; values stored under `identifiers`
    PrimaryKey,
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Logical kinds, checked before the registry
    pub logical_kinds: LogicalKinds,
    /// Shape rendered for registry tables
    pub schema_backed_shape: SchemaBackedShape,
    /// How long the table list stays cached
    pub table_cache_ttl_secs: u64,
}

impl ResolverConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With logical kinds
    #[inline]
    #[must_use]
    pub fn with_logical_kinds(mut self, kinds: LogicalKinds) -> Self {
        self.logical_kinds = kinds;
        self
    }

    /// With schema-backed shape
    #[inline]
    #[must_use]
    pub fn with_schema_backed_shape(mut self, shape: SchemaBackedShape) -> Self {
        self.schema_backed_shape = shape;
        self
    }

    /// With table cache TTL
    #[inline]
    #[must_use]
    pub fn with_table_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.table_cache_ttl_secs = secs;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            logical_kinds: LogicalKinds::default(),
            schema_backed_shape: SchemaBackedShape::Data,
            table_cache_ttl_secs: 300,
        }
    }
}

/// Where an identifier field set comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentifierSource {
    /// Fixed field of a logical kind
    Logical(String),
    /// Primary key of a registry table
    PrimaryKey(String),
}

/// Field shape an Object renders after resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedShape {
    /// Identifier fields (values stored under `identifiers`)
    Identifiers {
        /// Origin of the columns
        source: IdentifierSource,
        /// Ordered identifier field names
        columns: Vec<String>,
    },
    /// Schema-backed layout (values stored under `data`)
    Data {
        /// Registry table
        table: String,
        /// Section layout
        schema: SchemaDescriptor,
        /// Primary-key columns within the layout, empty when unknown
        key_columns: Vec<String>,
    },
}

impl ResolvedShape {
    /// Field names in render order
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::Identifiers { columns, .. } => columns.iter().map(String::as_str).collect(),
            Self::Data { schema, .. } => schema.fields().map(|f| f.name.as_str()).collect(),
        }
    }

    /// Whether `name` is a rendered field
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        match self {
            Self::Identifiers { columns, .. } => columns.iter().any(|c| c == name),
            Self::Data { schema, .. } => schema.field(name).is_some(),
        }
    }

    /// Descriptor for a data field, `None` for identifier shapes
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        match self {
            Self::Identifiers { .. } => None,
            Self::Data { schema, .. } => schema.field(name),
        }
    }

    /// Whether values go under `identifiers`
    #[inline]
    #[must_use]
    pub fn is_identifiers(&self) -> bool {
        matches!(self, Self::Identifiers { .. })
    }
}

/// Origin of a type-selector option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Logical kind
    Logical,
    /// Registry table
    Table,
}

/// One entry of the object-type selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorOption {
    /// Token submitted as `object_type`
    pub token: String,
    /// Where the option comes from
    pub kind: OptionKind,
}

/// Classifies object types and resolves their field shapes
pub struct SchemaResolver {
    registry: Arc<dyn SchemaRegistry>,
    config: ResolverConfig,
    catalog: TableCatalog,
}

impl fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl SchemaResolver {
    /// Create resolver with default configuration
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<dyn SchemaRegistry>) -> Self {
        Self::with_config(registry, ResolverConfig::default())
    }

    /// Create resolver with configuration
    #[must_use]
    pub fn with_config(registry: Arc<dyn SchemaRegistry>, config: ResolverConfig) -> Self {
        let catalog = TableCatalog::new(Duration::from_secs(config.table_cache_ttl_secs));
        Self {
            registry,
            config,
            catalog,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Classify a type token
    ///
    /// Logical kinds take precedence; any other non-blank token is assumed to
    /// be a registry table. Pure function of the configured kinds.
    #[must_use]
    pub fn classify(&self, token: &str) -> Classification {
        let token = token.trim();
        if token.is_empty() {
            Classification::Unresolved
        } else if self.config.logical_kinds.contains(token) {
            Classification::Logical(token.to_string())
        } else {
            Classification::SchemaBacked(token.to_string())
        }
    }

    /// Fixed identifier field of a logical kind
    #[inline]
    #[must_use]
    pub fn resolve_identifier_shape(&self, kind: &str) -> Option<&str> {
        self.config.logical_kinds.identifier_field(kind)
    }

    /// Shape of a logical kind, `None` if `kind` is not configured
    #[must_use]
    pub fn logical_shape(&self, kind: &str) -> Option<ResolvedShape> {
        self.resolve_identifier_shape(kind)
            .map(|field| ResolvedShape::Identifiers {
                source: IdentifierSource::Logical(kind.to_string()),
                columns: vec![field.to_string()],
            })
    }

    /// Field layout of a registry table
    ///
    /// # Errors
    /// - `SchemaError::Fetch` if the table is unknown or the registry unreachable
    /// - `SchemaError::Shape` if the response carries no usable layout
    pub async fn resolve_fields(&self, table: &str) -> SchemaResult<SchemaDescriptor> {
        let response = self
            .registry
            .fields(table)
            .await
            .map_err(|e| SchemaError::from_registry(table, e))?;

        if let Some(error) = response.error {
            return Err(SchemaError::fetch(table, error));
        }

        let sections = response
            .sections
            .ok_or_else(|| SchemaError::shape(table, "response carries no sections"))?;
        let sections: IndexMap<String, Vec<FieldDescriptor>> =
            serde_json::from_value(sections).map_err(|e| SchemaError::shape(table, e.to_string()))?;

        let schema = SchemaDescriptor::new(sections);
        if schema.is_empty() {
            return Err(SchemaError::shape(table, "layout has no fields"));
        }

        tracing::debug!(
            table,
            sections = schema.sections.len(),
            fields = schema.field_count(),
            "field layout resolved"
        );
        Ok(schema)
    }

    /// Primary-key columns of a registry table
    ///
    /// # Errors
    /// - `SchemaError::Fetch` if the table is unknown or the registry unreachable
    /// - `SchemaError::Shape` if the response does not decode
    /// - `SchemaError::NoPrimaryKey` if the key is empty
    pub async fn resolve_primary_key(&self, table: &str) -> SchemaResult<Vec<String>> {
        let response = self
            .registry
            .raw(table)
            .await
            .map_err(|e| SchemaError::from_registry(table, e))?;

        let columns: Vec<String> = response
            .primary_key
            .iter()
            .map(|c| c.name().trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if columns.is_empty() {
            return Err(SchemaError::NoPrimaryKey {
                table: table.to_string(),
            });
        }
        Ok(columns)
    }

    /// Shape of a registry table per the configured [`SchemaBackedShape`]
    ///
    /// In `Data` mode the layout and key are fetched concurrently; a missing
    /// key only leaves `key_columns` empty.
    ///
    /// # Errors
    /// As [`resolve_fields`](Self::resolve_fields) (`Data`) or
    /// [`resolve_primary_key`](Self::resolve_primary_key) (`PrimaryKey`)
    pub async fn schema_backed_shape(&self, table: &str) -> SchemaResult<ResolvedShape> {
        match self.config.schema_backed_shape {
            SchemaBackedShape::Data => {
                let (fields, key) =
                    futures::join!(self.resolve_fields(table), self.resolve_primary_key(table));
                let schema = fields?;
                let key_columns = key.unwrap_or_else(|e| {
                    tracing::debug!(table, error = %e, "layout resolved without key columns");
                    Vec::new()
                });
                Ok(ResolvedShape::Data {
                    table: table.to_string(),
                    schema,
                    key_columns,
                })
            }
            SchemaBackedShape::PrimaryKey => {
                let columns = self.resolve_primary_key(table).await?;
                Ok(ResolvedShape::Identifiers {
                    source: IdentifierSource::PrimaryKey(table.to_string()),
                    columns,
                })
            }
        }
    }

    /// Options for an object-type selector: logical kinds, then registry tables
    ///
    /// A registry failure degrades to the logical kinds alone.
    pub async fn selector_options(&self) -> Vec<SelectorOption> {
        let mut options: Vec<SelectorOption> = self
            .config
            .logical_kinds
            .kinds()
            .map(|kind| SelectorOption {
                token: kind.to_string(),
                kind: OptionKind::Logical,
            })
            .collect();

        match self.catalog.tables(self.registry.as_ref()).await {
            Ok(tables) => options.extend(
                tables
                    .iter()
                    .filter(|t| !self.config.logical_kinds.contains(t))
                    .map(|t| SelectorOption {
                        token: t.clone(),
                        kind: OptionKind::Table,
                    }),
            ),
            Err(e) => tracing::warn!(error = %e, "table list unavailable, offering logical kinds only"),
        }

        options
    }

    /// Drop the cached table list
    #[inline]
    pub fn refresh_tables(&self) {
        self.catalog.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use crate::registry::{StaticSchemaRegistry, TableFixture};

    fn order_release() -> SchemaDescriptor {
        SchemaDescriptor::default()
            .with_section(
                "CORE",
                vec![
                    FieldDescriptor::new("ORDER_RELEASE_GID").required(),
                    FieldDescriptor::new("ORDER_RELEASE_NAME").with_max_length(120),
                ],
            )
            .with_section(
                "DATAS",
                vec![FieldDescriptor::new("EARLY_PICKUP_DATE").with_type(FieldType::Date)],
            )
    }

    fn resolver(shape: SchemaBackedShape) -> SchemaResolver {
        let registry = StaticSchemaRegistry::new()
            .with_table(
                "ORDER_RELEASE",
                TableFixture::from_schema(&order_release()).with_primary_key(["ORDER_RELEASE_GID"]),
            )
            .with_table("NO_KEY", TableFixture::from_schema(&order_release()))
            .with_table("BROKEN", TableFixture::default().with_raw_sections(serde_json::json!([1, 2])))
            .with_table("EMPTY", TableFixture::default().with_raw_sections(serde_json::json!({"CORE": []})))
            .with_table(
                "NUMERIC_DEFAULT",
                TableFixture::default().with_raw_sections(serde_json::json!({
                    "CORE": [{"name": "PRIORITY", "type": "number", "defaultValue": 1}]
                })),
            )
            .with_table("REFUSED", TableFixture::default().with_error("Tabela não encontrada"));
        SchemaResolver::with_config(
            Arc::new(registry),
            ResolverConfig::new().with_schema_backed_shape(shape),
        )
    }

    #[test]
    fn classify_logical_kinds() {
        let resolver = resolver(SchemaBackedShape::Data);
        for kind in ["SAVED_QUERY", "AGENT", "FINDER_SET", "RATE", "EVENT_GROUP"] {
            assert_eq!(resolver.classify(kind), Classification::Logical(kind.to_string()));
        }
    }

    #[test]
    fn classify_tables_and_blanks() {
        let resolver = resolver(SchemaBackedShape::Data);
        assert_eq!(
            resolver.classify("ORDER_RELEASE"),
            Classification::SchemaBacked("ORDER_RELEASE".to_string())
        );
        assert_eq!(resolver.classify("  "), Classification::Unresolved);
        assert_eq!(resolver.classify(""), Classification::Unresolved);
        assert_eq!(
            resolver.classify(" AGENT "),
            Classification::Logical("AGENT".to_string())
        );
    }

    #[test]
    fn identifier_shape_lookup() {
        let resolver = resolver(SchemaBackedShape::Data);
        assert_eq!(resolver.resolve_identifier_shape("SAVED_QUERY"), Some("query_name"));
        assert_eq!(resolver.resolve_identifier_shape("RATE"), Some("rate_offering_gid"));
        assert_eq!(resolver.resolve_identifier_shape("ORDER_RELEASE"), None);
    }

    #[tokio::test]
    async fn resolve_fields_ok() {
        let schema = resolver(SchemaBackedShape::Data)
            .resolve_fields("ORDER_RELEASE")
            .await
            .unwrap();
        assert_eq!(schema, order_release());
    }

    #[tokio::test]
    async fn resolve_fields_errors() {
        let resolver = resolver(SchemaBackedShape::Data);

        let unknown = resolver.resolve_fields("SHIPMENT").await.unwrap_err();
        assert!(matches!(unknown, SchemaError::Fetch { .. }));

        let refused = resolver.resolve_fields("REFUSED").await.unwrap_err();
        assert_eq!(refused, SchemaError::fetch("REFUSED", "Tabela não encontrada"));

        let broken = resolver.resolve_fields("BROKEN").await.unwrap_err();
        assert!(matches!(broken, SchemaError::Shape { .. }));

        let empty = resolver.resolve_fields("EMPTY").await.unwrap_err();
        assert!(matches!(empty, SchemaError::Shape { .. }));
    }

    #[tokio::test]
    async fn numeric_default_does_not_break_layout() {
        let schema = resolver(SchemaBackedShape::Data)
            .resolve_fields("NUMERIC_DEFAULT")
            .await
            .unwrap();
        let priority = schema.fields().next().unwrap();
        assert_eq!(priority.default_value.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn empty_primary_key_is_reported() {
        let err = resolver(SchemaBackedShape::PrimaryKey)
            .resolve_primary_key("NO_KEY")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::NoPrimaryKey {
                table: "NO_KEY".to_string()
            }
        );
    }

    #[tokio::test]
    async fn data_mode_tolerates_missing_key() {
        let shape = resolver(SchemaBackedShape::Data)
            .schema_backed_shape("NO_KEY")
            .await
            .unwrap();
        match shape {
            ResolvedShape::Data { key_columns, .. } => assert!(key_columns.is_empty()),
            ResolvedShape::Identifiers { .. } => panic!("expected data shape"),
        }
    }

    #[tokio::test]
    async fn primary_key_mode_renders_identifiers() {
        let shape = resolver(SchemaBackedShape::PrimaryKey)
            .schema_backed_shape("ORDER_RELEASE")
            .await
            .unwrap();
        assert!(shape.is_identifiers());
        assert_eq!(shape.field_names(), vec!["ORDER_RELEASE_GID"]);
    }

    #[tokio::test]
    async fn selector_lists_logical_kinds_first() {
        let options = resolver(SchemaBackedShape::Data).selector_options().await;
        assert_eq!(options[0].token, "SAVED_QUERY");
        assert_eq!(options[0].kind, OptionKind::Logical);
        assert!(options
            .iter()
            .any(|o| o.token == "ORDER_RELEASE" && o.kind == OptionKind::Table));
        assert_eq!(options.len(), 5 + 6);
    }
}
