//! Testing utilities for MPF workspace
//!
//! Shared test helpers, fixtures, and a scriptable registry.

#![allow(missing_docs)]

use async_trait::async_trait;
use mpf_schema::{
    FieldConstraint, FieldDescriptor, FieldType, FieldsResponse, RawSchemaResponse, RegistryError,
    SchemaDescriptor, SchemaRegistry, SchemaResolver, StaticSchemaRegistry, TableFixture, TablesResponse,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub fn order_release_schema() -> SchemaDescriptor {
    SchemaDescriptor::default()
        .with_section(
            "CORE",
            vec![
                FieldDescriptor::new("ORDER_RELEASE_GID")
                    .with_label("Order Release")
                    .required()
                    .with_max_length(101),
                FieldDescriptor::new("ORDER_RELEASE_NAME").with_max_length(120),
                FieldDescriptor::new("PRIORITY")
                    .with_type(FieldType::Number)
                    .with_constraint(FieldConstraint::range(1.0, 999.0))
                    .with_default("1"),
            ],
        )
        .with_section(
            "DATAS",
            vec![FieldDescriptor::new("EARLY_PICKUP_DATE").with_type(FieldType::Date)],
        )
        .with_section(
            "OUTROS",
            vec![
                FieldDescriptor::new("IS_TEMPLATE")
                    .with_type(FieldType::Select)
                    .with_constraint(FieldConstraint::options(["Y", "N"])),
                FieldDescriptor::new("SOURCE_LOCATION_GID").with_lookup("LOCATION", "LOCATION_GID"),
            ],
        )
}

pub fn location_schema() -> SchemaDescriptor {
    SchemaDescriptor::default().with_section(
        "CORE",
        vec![
            FieldDescriptor::new("LOCATION_GID").required(),
            FieldDescriptor::new("LOCATION_NAME"),
            FieldDescriptor::new("IS_TEMPORARY").with_type(FieldType::Boolean),
        ],
    )
}

/// ORDER_RELEASE and LOCATION (with keys), NO_KEY_TABLE (layout, empty key),
/// REFUSED_TABLE (registry reports an error)
pub fn sample_registry() -> StaticSchemaRegistry {
    StaticSchemaRegistry::new()
        .with_table(
            "ORDER_RELEASE",
            TableFixture::from_schema(&order_release_schema()).with_primary_key(["ORDER_RELEASE_GID"]),
        )
        .with_table(
            "LOCATION",
            TableFixture::from_schema(&location_schema()).with_primary_key(["LOCATION_GID"]),
        )
        .with_table("NO_KEY_TABLE", TableFixture::from_schema(&location_schema()))
        .with_table("REFUSED_TABLE", TableFixture::default().with_error("Tabela não encontrada"))
}

/// Snapshot exercising a logical kind, a schema-backed table and the legacy
/// `type` key
pub const SAMPLE_SNAPSHOT_JSON: &str = r#"{
  "groups": [
    {
      "group_id": "G1",
      "label": "Automation",
      "description": "Saved queries and agents",
      "sequence": 1,
      "objects": [
        {
          "name": "Active orders",
          "object_type": "SAVED_QUERY",
          "deployment_type": "MIGRATION_PROJECT",
          "sequence": 1,
          "status_documentation": "DONE",
          "status_deployment": "PENDING",
          "identifiers": { "query_name": "ACTIVE_ORDERS" }
        },
        {
          "name": "Notify driver",
          "type": "AGENT",
          "deployment_type": "MANUAL",
          "identifiers": { "agent_gid": "BR.NOTIFY_DRIVER" }
        }
      ]
    },
    {
      "label": "Master data",
      "sequence": "2",
      "objects": [
        {
          "name": "Template release",
          "object_type": "ORDER_RELEASE",
          "deployment_type": "CSV",
          "status_documentation": "IN_PROGRESS",
          "status_deployment": "",
          "data": { "ORDER_RELEASE_GID": "BR.TEMPLATE_01", "IS_TEMPLATE": "Y" }
        }
      ]
    }
  ],
  "change_history": [
    { "date": "01/01/2024", "version": "1.0", "description": "Kickoff", "author": "ana" },
    { "date": "15/03/2024", "version": "1.1", "description": "Agents", "author": "rui" }
  ]
}"#;

/// Registry wrapper with failure injection and call counters
///
/// Share it as `Arc<ScriptedRegistry>` and hand a clone to the resolver as
/// `Arc<dyn SchemaRegistry>`; the test keeps the other handle to script
/// outages and inspect traffic.
#[derive(Debug, Default)]
pub struct ScriptedRegistry {
    tables: StaticSchemaRegistry,
    vanished: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedRegistry {
    pub fn new(tables: StaticSchemaRegistry) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    pub fn shared(tables: StaticSchemaRegistry) -> Arc<Self> {
        Arc::new(Self::new(tables))
    }

    /// Table answers not-found until [`restore_table`](Self::restore_table)
    pub fn vanish_table(&self, table: &str) {
        self.vanished.lock().insert(table.to_ascii_uppercase());
    }

    pub fn restore_table(&self, table: &str) {
        self.vanished.lock().remove(&table.to_ascii_uppercase());
    }

    /// Every call fails as unreachable while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Calls made to `endpoint` (`tables`, `fields` or `raw`) for `table`
    pub fn calls(&self, endpoint: &str, table: &str) -> usize {
        let key = format!("{endpoint}:{}", table.to_ascii_uppercase());
        self.calls.lock().get(&key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    fn record(&self, endpoint: &str, table: &str) -> Result<(), RegistryError> {
        let key = format!("{endpoint}:{}", table.to_ascii_uppercase());
        *self.calls.lock().entry(key).or_insert(0) += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(RegistryError::Unreachable("scripted outage".to_string()));
        }
        if self.vanished.lock().contains(&table.to_ascii_uppercase()) {
            return Err(RegistryError::not_found(table));
        }
        Ok(())
    }
}

#[async_trait]
impl SchemaRegistry for ScriptedRegistry {
    async fn list_tables(&self) -> Result<TablesResponse, RegistryError> {
        self.record("tables", "")?;
        self.tables.list_tables().await
    }

    async fn fields(&self, table: &str) -> Result<FieldsResponse, RegistryError> {
        self.record("fields", table)?;
        self.tables.fields(table).await
    }

    async fn raw(&self, table: &str) -> Result<RawSchemaResponse, RegistryError> {
        self.record("raw", table)?;
        self.tables.raw(table).await
    }
}

/// Resolver over [`sample_registry`] with default configuration
pub fn sample_resolver() -> Arc<SchemaResolver> {
    Arc::new(SchemaResolver::new(Arc::new(sample_registry())))
}

/// Resolver over a scripted [`sample_registry`], plus the script handle
pub fn scripted_resolver() -> (Arc<SchemaResolver>, Arc<ScriptedRegistry>) {
    let scripted = ScriptedRegistry::shared(sample_registry());
    let registry: Arc<dyn SchemaRegistry> = scripted.clone();
    (Arc::new(SchemaResolver::new(registry)), scripted)
}
