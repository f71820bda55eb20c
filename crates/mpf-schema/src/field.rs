//! Field and section layout types
//!
//! These mirror the registry's `/fields` payload: an ordered mapping of
//! section name to ordered field descriptors.

use crate::validate::scalar_text;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Input type of a rendered field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    #[default]
    Text,
    /// Numeric input
    Number,
    /// Calendar date
    Date,
    /// Checkbox
    Boolean,
    /// Drop-down over a fixed option list
    Select,
}

impl FieldType {
    /// Wire name of the type
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value constraint attached to a field
///
/// The registry sends either `{options: [...]}` for enumerations or
/// `{min, max}` for numeric ranges; a free-form `conditional` rule may ride
/// along and is kept for display only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldConstraint {
    /// Allowed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Lower numeric bound (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper numeric bound (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Raw conditional rule text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<String>,
}

impl FieldConstraint {
    /// Enumeration constraint
    #[must_use]
    pub fn options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: Some(options.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Range constraint
    #[inline]
    #[must_use]
    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    /// Allowed values, empty when not an enumeration
    #[inline]
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Whether any numeric bound is present
    #[inline]
    #[must_use]
    pub fn is_range(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Foreign-key reference metadata, display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLookup {
    /// Referenced table
    pub table: String,
    /// Referenced column
    pub column: String,
}

/// One field of a table layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Column name; also the key under `data`
    pub name: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Input type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Whether the field must be filled
    #[serde(default)]
    pub required: bool,
    /// Maximum text length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Value pre-filled on interactive rendering
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "default_text"
    )]
    pub default_value: Option<String>,
    /// Enumeration or range constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<FieldConstraint>,
    /// Foreign-key reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<FieldLookup>,
}

impl FieldDescriptor {
    /// Create a text field whose label equals its name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            field_type: FieldType::Text,
            required: false,
            max_length: None,
            default_value: None,
            constraint: None,
            lookup: None,
        }
    }

    /// With input type
    #[inline]
    #[must_use]
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// With maximum length
    #[inline]
    #[must_use]
    pub fn with_max_length(mut self, max: u32) -> Self {
        self.max_length = Some(max);
        self
    }

    /// With default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// With constraint
    #[inline]
    #[must_use]
    pub fn with_constraint(mut self, constraint: FieldConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// With lookup reference
    #[inline]
    #[must_use]
    pub fn with_lookup(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.lookup = Some(FieldLookup {
            table: table.into(),
            column: column.into(),
        });
        self
    }

    /// Label to display, falling back to the name
    #[inline]
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    /// One-line help text derived from constraint or lookup
    ///
    /// Options take precedence over ranges, ranges over lookups.
    #[must_use]
    pub fn help_text(&self) -> Option<String> {
        if let Some(constraint) = &self.constraint {
            if !constraint.allowed().is_empty() {
                return Some(format!("Allowed values: {}", constraint.allowed().join(", ")));
            }
            if constraint.is_range() {
                let bound = |b: Option<f64>| b.map(|v| v.to_string()).unwrap_or_default();
                return Some(format!(
                    "Range: {} - {}",
                    bound(constraint.min),
                    bound(constraint.max)
                ));
            }
        }
        self.lookup
            .as_ref()
            .map(|lookup| format!("Lookup: {}.{}", lookup.table, lookup.column))
    }
}

/// Registry answer for one table: ordered sections of ordered fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Section name → fields
    pub sections: IndexMap<String, Vec<FieldDescriptor>>,
}

impl SchemaDescriptor {
    /// Create from sections
    #[inline]
    #[must_use]
    pub fn new(sections: IndexMap<String, Vec<FieldDescriptor>>) -> Self {
        Self { sections }
    }

    /// Add a section (builder style)
    #[must_use]
    pub fn with_section(mut self, name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        self.sections.insert(name.into(), fields);
        self
    }

    /// All fields in section order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.sections.values().flatten()
    }

    /// Find field by exact name (first occurrence)
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|f| f.name == name)
    }

    /// Total number of fields across sections
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// Whether the layout carries no fields at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}

/// Registries send defaults as strings, numbers or booleans; blank or null
/// means no default
fn default_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
    Ok(Some(scalar_text(&value)).filter(|text| !text.trim().is_empty()))
}
