//! Migration project form tree
//!
//! Groups of Objects, each Object describing one target-system entity whose
//! fields depend on its selected type.
//!
//! # Core Operations
//!
//! - **Structure**: add/remove Groups and Objects on never-reused slots
//! - **Type selection**: classify, resolve and render identifier or data fields
//! - **Rehydration**: rebuild the tree from a [`ProjectSnapshot`]
//! - **Egress**: [`FormTree::serialize`], [`FormTree::to_form_fields`], [`FormTree::render`]
//!
//! # Architecture
//!
//! ```text
//! ProjectSnapshot ─→ FormTree::rehydrate ─→ FormTree ─→ serialize / to_form_fields
//!                          │                   │
//!                   IndexAllocator       SchemaResolver (tickets, generations)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mpf_form::prelude::*;
//!
//! # async fn example(resolver: std::sync::Arc<mpf_schema::SchemaResolver>) -> FormResult<()> {
//! let mut tree = FormTree::new(resolver);
//! let group = tree.add_group();
//! let object = tree.add_object(group)?;
//! tree.select_object_type(object, "ORDER_RELEASE").await?;
//! let snapshot = tree.serialize();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod allocator;
pub mod error;
pub mod hints;
pub mod model;
pub mod naming;
pub mod render;
pub mod shape;
pub mod snapshot;
pub mod tree;

pub use allocator::{GroupSlot, IndexAllocator, ObjectPath, ObjectSlot};
pub use error::{FormError, FormResult};
pub use hints::FormHint;
pub use model::{DeploymentType, FieldValues, GroupFields, ObjectFields, ObjectPayload, Status};
pub use naming::snapshot_from_form_fields;
pub use render::{GroupView, InputKind, InputView, ObjectView, SectionView, ShapeStatus};
pub use shape::{ObjectShape, RenderedFields};
pub use snapshot::{GroupSnapshot, ObjectSnapshot, ProjectSnapshot};
pub use tree::{
    ApplyOutcome, FormTree, GroupNode, ObjectNode, RehydrationReport, Resolution, ResolutionTicket,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::allocator::{GroupSlot, ObjectPath};
    pub use crate::error::{FormError, FormResult};
    pub use crate::model::{GroupFields, ObjectFields, ObjectPayload};
    pub use crate::shape::ObjectShape;
    pub use crate::snapshot::ProjectSnapshot;
    pub use crate::tree::{ApplyOutcome, FormTree};
}
