//! Schema resolution for migration project forms
//!
//! Decides, per Object, which field shape the form renders:
//!
//! - **Logical kinds** (`SAVED_QUERY`, `AGENT`, ...): one fixed identifier field
//! - **Schema-backed tables**: a sectioned field layout, or the table's
//!   primary-key columns, fetched from the schema registry
//!
//! # Architecture
//!
//! ```text
//! object_type token → SchemaResolver::classify → Logical(kind)      → identifier field
//!                                              → SchemaBacked(table) → SchemaRegistry (/fields, /raw)
//!                                              → Unresolved          → nothing rendered
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mpf_schema::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = HttpSchemaRegistry::new(&HttpRegistryConfig::default())?;
//! let resolver = SchemaResolver::new(Arc::new(registry));
//!
//! if let Classification::SchemaBacked(table) = resolver.classify("ORDER_RELEASE") {
//!     let shape = resolver.schema_backed_shape(&table).await?;
//!     println!("{:?}", shape.field_names());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod catalog;
pub mod error;
pub mod field;
pub mod registry;
pub mod resolver;
pub mod validate;

pub use catalog::TableCatalog;
pub use error::{RegistryError, SchemaError, SchemaResult};
pub use field::{FieldConstraint, FieldDescriptor, FieldLookup, FieldType, SchemaDescriptor};
pub use registry::{
    FieldsResponse, HttpRegistryConfig, HttpSchemaRegistry, PrimaryKeyColumn, RawSchemaResponse,
    SchemaRegistry, StaticSchemaRegistry, TableFixture, TablesResponse,
};
pub use resolver::{
    Classification, IdentifierSource, LogicalKinds, OptionKind, ResolvedShape, ResolverConfig,
    SchemaBackedShape, SchemaResolver, SelectorOption,
};
pub use validate::{check_value, FieldIssue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{SchemaError, SchemaResult};
    pub use crate::field::{FieldDescriptor, FieldType, SchemaDescriptor};
    pub use crate::registry::{
        HttpRegistryConfig, HttpSchemaRegistry, SchemaRegistry, StaticSchemaRegistry,
    };
    pub use crate::resolver::{Classification, ResolvedShape, ResolverConfig, SchemaResolver};
}
