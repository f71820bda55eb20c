//! Error types for schema resolution
//!
//! Two layers:
//! - [`RegistryError`]: what the registry boundary reports (transport, status, decoding)
//! - [`SchemaError`]: what an Object sees after resolution; always recovered locally

/// Errors reported by a [`SchemaRegistry`](crate::SchemaRegistry) implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The registry has no such table
    #[error("table not found: {table}")]
    NotFound {
        /// Requested table name
        table: String,
    },

    /// The registry could not be reached or answered with a server error
    #[error("registry unreachable: {0}")]
    Unreachable(String),

    /// The registry answered but the body could not be decoded
    #[error("invalid registry response: {0}")]
    InvalidResponse(String),
}

impl RegistryError {
    /// Create not-found error for table
    #[inline]
    pub fn not_found(table: impl Into<String>) -> Self {
        Self::NotFound {
            table: table.into(),
        }
    }
}

/// Resolution failure for a single Object's type
///
/// None of these are fatal: the affected Object shows the condition inline
/// and its siblings are untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Table unknown to the registry, or registry unreachable
    #[error("could not load schema for {table}: {reason}")]
    Fetch {
        /// Table being resolved
        table: String,
        /// Registry-provided or transport reason
        reason: String,
    },

    /// Registry answered without a usable field layout
    #[error("malformed schema for {table}: {reason}")]
    Shape {
        /// Table being resolved
        table: String,
        /// What was wrong with the layout
        reason: String,
    },

    /// Registry reports an empty primary key; identifier entry is blocked
    #[error("table {table} has no primary key defined")]
    NoPrimaryKey {
        /// Table being resolved
        table: String,
    },
}

impl SchemaError {
    /// Create fetch error for table
    #[inline]
    pub fn fetch(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create shape error for table
    #[inline]
    pub fn shape(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Shape {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Table this error refers to
    #[inline]
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Fetch { table, .. } | Self::Shape { table, .. } | Self::NoPrimaryKey { table } => {
                table
            }
        }
    }

    /// Whether this error blocks identifier entry (as opposed to a load failure)
    #[inline]
    #[must_use]
    pub fn blocks_identifiers(&self) -> bool {
        matches!(self, Self::NoPrimaryKey { .. })
    }

    /// Map a registry error raised while resolving `table`
    #[must_use]
    pub fn from_registry(table: &str, error: RegistryError) -> Self {
        match error {
            RegistryError::NotFound { .. } => Self::fetch(table, "table not found in registry"),
            RegistryError::Unreachable(reason) => Self::fetch(table, reason),
            RegistryError::InvalidResponse(reason) => Self::shape(table, reason),
        }
    }
}

/// Result type alias for schema resolution
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_error_display() {
        let err = RegistryError::not_found("ORDER_RELEASE");
        assert_eq!(err.to_string(), "table not found: ORDER_RELEASE");
    }

    #[test]
    fn schema_error_table() {
        assert_eq!(SchemaError::fetch("A", "x").table(), "A");
        assert_eq!(SchemaError::shape("B", "x").table(), "B");
        assert_eq!(
            SchemaError::NoPrimaryKey {
                table: "C".to_string()
            }
            .table(),
            "C"
        );
    }

    #[test]
    fn registry_errors_map_to_schema_errors() {
        let fetch = SchemaError::from_registry("T", RegistryError::not_found("T"));
        assert!(matches!(fetch, SchemaError::Fetch { .. }));

        let down = SchemaError::from_registry("T", RegistryError::Unreachable("refused".into()));
        assert_eq!(down, SchemaError::fetch("T", "refused"));

        let garbled =
            SchemaError::from_registry("T", RegistryError::InvalidResponse("eof".into()));
        assert!(matches!(garbled, SchemaError::Shape { .. }));
    }

    #[test]
    fn only_missing_key_blocks_identifiers() {
        assert!(SchemaError::NoPrimaryKey {
            table: "T".to_string()
        }
        .blocks_identifiers());
        assert!(!SchemaError::fetch("T", "x").blocks_identifiers());
    }
}
