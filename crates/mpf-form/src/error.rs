//! Error types for the form tree
//!
//! Schema failures are not here: they live on the affected Object as
//! [`ObjectShape::Failed`](crate::ObjectShape::Failed). A [`FormError`] means
//! the driver addressed something that does not exist or handed over input
//! that cannot be decoded.

use crate::allocator::{GroupSlot, ObjectPath};

/// Form tree misuse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// No live group at this slot
    #[error("unknown group: {0}")]
    UnknownGroup(GroupSlot),

    /// No live object at this path
    #[error("unknown object: {0}")]
    UnknownObject(ObjectPath),

    /// The object has no rendered field with this name
    #[error("field {field} is not rendered on {path}")]
    FieldNotRendered {
        /// Object addressed
        path: ObjectPath,
        /// Field requested
        field: String,
    },

    /// A submitted field name or value does not follow the naming convention
    #[error("invalid form field {name}: {reason}")]
    InvalidFormField {
        /// Submitted name
        name: String,
        /// What was wrong
        reason: String,
    },

    /// Snapshot document could not be decoded
    #[error("snapshot decode failed: {0}")]
    Snapshot(String),
}

impl FormError {
    /// Create invalid form field error
    #[inline]
    pub fn invalid_field(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormField {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FormError {
    fn from(e: serde_json::Error) -> Self {
        Self::Snapshot(e.to_string())
    }
}

/// Result type alias for form operations
pub type FormResult<T> = Result<T, FormError>;
