//! Serialized project snapshot
//!
//! The wire document the page embeds at load and the tree produces on
//! [`serialize`](crate::FormTree::serialize). Decoding is lenient:
//! - `sequence` takes a number or a numeric string
//! - enum fields take `""` as absent
//! - `object_type` falls back to the legacy `type` key
//! - unknown keys are ignored

use crate::error::FormResult;
use crate::model::{lenient, FieldValues, GroupFields, ObjectFields, ObjectPayload};
use serde::{Deserialize, Serialize};

/// Whole Group/Object tree, without the change history
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Groups in display order
    #[serde(default)]
    pub groups: Vec<GroupSnapshot>,
}

impl ProjectSnapshot {
    /// Decode from JSON text
    ///
    /// # Errors
    /// `FormError::Snapshot` if the text is not a valid snapshot
    pub fn from_json(json: &str) -> FormResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as pretty JSON
    ///
    /// # Errors
    /// `FormError::Snapshot` if encoding fails
    pub fn to_json_pretty(&self) -> FormResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of objects across groups
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.groups.iter().map(|g| g.objects.len()).sum()
    }
}

/// One Group with its Objects
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupSnapshot {
    /// Scalar fields
    #[serde(flatten)]
    pub fields: GroupFields,
    /// Objects in display order
    #[serde(default)]
    pub objects: Vec<ObjectSnapshot>,
}

/// One Object: scalars, type token and stored values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    /// Scalar fields
    #[serde(flatten)]
    pub fields: ObjectFields,
    /// Type token
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub object_type: Option<String>,
    /// Older documents carry the token here
    #[serde(
        rename = "type",
        default,
        skip_serializing,
        deserialize_with = "lenient::text"
    )]
    pub legacy_type: Option<String>,
    /// Identifier values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<FieldValues>,
    /// Schema-backed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<FieldValues>,
}

impl ObjectSnapshot {
    /// Type token to resolve: `object_type`, else legacy `type`
    #[must_use]
    pub fn effective_type(&self) -> Option<&str> {
        self.object_type
            .as_deref()
            .or(self.legacy_type.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Stored values as a payload
    ///
    /// Non-empty `data` is preferred over `identifiers` when a document
    /// carries both. An empty map is still a payload.
    #[must_use]
    pub fn payload(&self) -> Option<ObjectPayload> {
        let non_empty = |values: &Option<FieldValues>| values.as_ref().filter(|v| !v.is_empty()).cloned();

        non_empty(&self.data)
            .map(ObjectPayload::Data)
            .or_else(|| non_empty(&self.identifiers).map(ObjectPayload::Identifiers))
            .or_else(|| self.data.clone().map(ObjectPayload::Data))
            .or_else(|| self.identifiers.clone().map(ObjectPayload::Identifiers))
    }
}
