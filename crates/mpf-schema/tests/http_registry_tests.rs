//! HTTP Registry Tests
//!
//! Drives `HttpSchemaRegistry` and `SchemaResolver` against a local warp
//! server speaking the `/api/schema/*` protocol.

use mpf_schema::prelude::*;
use mpf_schema::{RegistryError, SchemaBackedShape, SchemaError};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

fn fields_for(table: &str) -> (Value, StatusCode) {
    match table {
        "ORDER_RELEASE" => (
            json!({
                "sections": {
                    "CORE": [
                        {"name": "ORDER_RELEASE_GID", "label": "Order Release", "type": "text", "required": true, "maxLength": 101},
                        {"name": "PRIORITY", "type": "number", "constraint": {"min": 1, "max": 999}}
                    ],
                    "OUTROS": [
                        {"name": "IS_TEMPLATE", "type": "select", "constraint": {"options": ["Y", "N"]}}
                    ]
                }
            }),
            StatusCode::OK,
        ),
        "LEGACY" => (json!({"error": "Tabela não encontrada"}), StatusCode::OK),
        "GARBLED" => (json!({"sections": "CORE"}), StatusCode::OK),
        _ => (json!({"error": "not found"}), StatusCode::NOT_FOUND),
    }
}

fn raw_for(table: &str) -> (Value, StatusCode) {
    match table {
        "ORDER_RELEASE" => (json!({"primaryKey": [{"columnName": "ORDER_RELEASE_GID"}]}), StatusCode::OK),
        "LEGACY" | "GARBLED" => (json!({"primaryKey": []}), StatusCode::OK),
        _ => (json!({"error": "not found"}), StatusCode::NOT_FOUND),
    }
}

async fn spawn_registry() -> SocketAddr {
    let tables = warp::path!("api" / "schema" / "tables")
        .map(|| warp::reply::json(&json!({"tables": ["GARBLED", "LEGACY", "ORDER_RELEASE"]})));

    let fields = warp::path!("api" / "schema" / String / "fields").map(|table: String| {
        let (body, status) = fields_for(&table);
        warp::reply::with_status(warp::reply::json(&body), status)
    });

    let raw = warp::path!("api" / "schema" / String / "raw").map(|table: String| {
        let (body, status) = raw_for(&table);
        warp::reply::with_status(warp::reply::json(&body), status)
    });

    let routes = warp::get().and(tables.or(fields).or(raw));
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

async fn http_registry() -> HttpSchemaRegistry {
    let addr = spawn_registry().await;
    HttpSchemaRegistry::new(&HttpRegistryConfig::new(format!("http://{addr}")).with_timeout_secs(5))
        .unwrap()
}

#[tokio::test]
async fn test_lists_tables() {
    let registry = http_registry().await;
    let tables = registry.list_tables().await.unwrap().tables;
    assert_eq!(tables, vec!["GARBLED", "LEGACY", "ORDER_RELEASE"]);
}

#[tokio::test]
async fn test_missing_table_is_not_found() {
    let registry = http_registry().await;
    let err = registry.fields("SHIPMENT").await.unwrap_err();
    assert_eq!(err, RegistryError::not_found("SHIPMENT"));
}

#[tokio::test]
async fn test_resolves_layout_over_http() {
    let resolver = SchemaResolver::new(Arc::new(http_registry().await));

    let schema = resolver.resolve_fields("ORDER_RELEASE").await.unwrap();
    let names: Vec<_> = schema.fields().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["ORDER_RELEASE_GID", "PRIORITY", "IS_TEMPLATE"]);

    let gid = schema.field("ORDER_RELEASE_GID").unwrap();
    assert!(gid.required);
    assert_eq!(gid.max_length, Some(101));
    assert_eq!(schema.field("IS_TEMPLATE").unwrap().field_type, FieldType::Select);
}

#[tokio::test]
async fn test_registry_refusals_become_schema_errors() {
    let resolver = SchemaResolver::new(Arc::new(http_registry().await));

    assert_eq!(
        resolver.resolve_fields("LEGACY").await.unwrap_err(),
        SchemaError::fetch("LEGACY", "Tabela não encontrada")
    );
    assert!(matches!(
        resolver.resolve_fields("GARBLED").await.unwrap_err(),
        SchemaError::Shape { .. }
    ));
    assert!(matches!(
        resolver.resolve_fields("SHIPMENT").await.unwrap_err(),
        SchemaError::Fetch { .. }
    ));
}

#[tokio::test]
async fn test_primary_key_shape_over_http() {
    let resolver = SchemaResolver::with_config(
        Arc::new(http_registry().await),
        ResolverConfig::new().with_schema_backed_shape(SchemaBackedShape::PrimaryKey),
    );

    let shape = resolver.schema_backed_shape("ORDER_RELEASE").await.unwrap();
    assert_eq!(shape.field_names(), vec!["ORDER_RELEASE_GID"]);

    let err = resolver.schema_backed_shape("LEGACY").await.unwrap_err();
    assert!(err.blocks_identifiers());
}

#[tokio::test]
async fn test_unreachable_registry_degrades_selector() {
    // Nothing listens on port 9 locally
    let registry = HttpSchemaRegistry::new(&HttpRegistryConfig::new("http://127.0.0.1:9").with_timeout_secs(2))
        .unwrap();
    let resolver = SchemaResolver::new(Arc::new(registry));

    let options = resolver.selector_options().await;
    let tokens: Vec<_> = options.iter().map(|o| o.token.as_str()).collect();
    assert_eq!(tokens, vec!["SAVED_QUERY", "AGENT", "FINDER_SET", "RATE", "EVENT_GROUP"]);
}
