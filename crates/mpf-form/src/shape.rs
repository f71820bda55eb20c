//! Per-object resolution state and rendered field values

use crate::allocator::ObjectPath;
use crate::error::{FormError, FormResult};
use crate::model::{FieldValues, ObjectPayload};
use indexmap::IndexSet;
use mpf_schema::validate::is_blank;
use mpf_schema::{ResolvedShape, SchemaError};
use serde_json::Value;

/// Where an Object stands with respect to its type
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectShape {
    /// No type selected; nothing rendered
    Unselected,
    /// Registry lookup in flight
    Pending {
        /// Table being resolved
        table: String,
        /// Stored values waiting to be overlaid
        retained: Option<ObjectPayload>,
    },
    /// Fields rendered
    Ready(RenderedFields),
    /// Resolution failed; shown inline on this Object only
    Failed {
        /// Why
        error: SchemaError,
        /// Stored values kept for a retry
        retained: Option<ObjectPayload>,
    },
}

impl ObjectShape {
    /// Rendered fields, if ready
    #[inline]
    #[must_use]
    pub fn rendered(&self) -> Option<&RenderedFields> {
        match self {
            Self::Ready(rendered) => Some(rendered),
            _ => None,
        }
    }

    /// Resolution error, if failed
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&SchemaError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Values this Object would submit: entered values when ready,
    /// retained values while pending or failed
    #[must_use]
    pub fn payload(&self) -> Option<ObjectPayload> {
        match self {
            Self::Unselected => None,
            Self::Ready(rendered) => rendered.payload(),
            Self::Pending { retained, .. } | Self::Failed { retained, .. } => retained.clone(),
        }
    }
}

/// A resolved shape together with the current input values
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFields {
    shape: ResolvedShape,
    values: FieldValues,
    /// Keys a stored payload carried; `None` until one is overlaid
    stored: Option<IndexSet<String>>,
}

impl RenderedFields {
    /// Every field present and empty
    #[must_use]
    pub fn blank(shape: ResolvedShape) -> Self {
        let values = shape
            .field_names()
            .into_iter()
            .map(|name| (name.to_string(), Value::String(String::new())))
            .collect();
        Self {
            shape,
            values,
            stored: None,
        }
    }

    /// Layout defaults filled in, as on interactive selection
    #[must_use]
    pub fn with_defaults(shape: ResolvedShape) -> Self {
        let mut rendered = Self::blank(shape);
        if let ResolvedShape::Data { schema, .. } = &rendered.shape {
            for field in schema.fields() {
                if let Some(default) = &field.default_value {
                    rendered
                        .values
                        .insert(field.name.clone(), Value::String(default.clone()));
                }
            }
        }
        rendered
    }

    /// Copy stored values onto fields with the exact same name
    ///
    /// A payload of the other shape matches nothing. Matched keys are
    /// submitted again even when blank. Returns the dropped keys.
    pub fn overlay(&mut self, payload: &ObjectPayload) -> Vec<String> {
        let matches_shape = payload.is_identifiers() == self.shape.is_identifiers();
        let mut dropped = Vec::new();
        let mut stored = IndexSet::new();

        for (name, value) in payload.values() {
            match self.values.get_mut(name) {
                Some(slot) if matches_shape => {
                    *slot = value.clone();
                    stored.insert(name.clone());
                }
                _ => dropped.push(name.clone()),
            }
        }
        if matches_shape {
            self.stored.get_or_insert_with(IndexSet::new).extend(stored);
        }
        dropped
    }

    /// Write one field
    ///
    /// # Errors
    /// `FormError::FieldNotRendered` if `name` is not part of the shape
    pub fn set(&mut self, path: ObjectPath, name: &str, value: Value) -> FormResult<()> {
        let slot = self.values.get_mut(name).ok_or_else(|| FormError::FieldNotRendered {
            path,
            field: name.to_string(),
        })?;
        *slot = value;
        Ok(())
    }

    /// Resolved shape
    #[inline]
    #[must_use]
    pub fn shape(&self) -> &ResolvedShape {
        &self.shape
    }

    /// All values, blank ones included, in render order
    #[inline]
    #[must_use]
    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    /// Value of one field
    #[inline]
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether `name` came from an overlaid payload
    #[inline]
    #[must_use]
    pub fn is_stored(&self, name: &str) -> bool {
        self.stored.as_ref().is_some_and(|keys| keys.contains(name))
    }

    /// Values under the shape's key
    ///
    /// Non-blank values plus every key a stored payload carried, blank or
    /// not. `None` when nothing is filled in and no payload was overlaid.
    #[must_use]
    pub fn payload(&self) -> Option<ObjectPayload> {
        let submitted: FieldValues = self
            .values
            .iter()
            .filter(|(name, value)| !is_blank(value) || self.is_stored(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        if submitted.is_empty() && self.stored.is_none() {
            None
        } else if self.shape.is_identifiers() {
            Some(ObjectPayload::Identifiers(submitted))
        } else {
            Some(ObjectPayload::Data(submitted))
        }
    }
}
