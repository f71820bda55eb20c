//! Group and Object scalar fields, and the dual-shape Object payload

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// How an Object gets deployed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentType {
    /// Moved by the migration project itself
    MigrationProject,
    /// Entered by hand in the target system
    Manual,
    /// Loaded from a CSV file
    Csv,
}

/// Progress of documentation or deployment work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Not started
    Pending,
    /// Under way
    InProgress,
    /// Finished
    Done,
}

macro_rules! wire_enum {
    ($ty:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            /// Wire name
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($ty))),
                }
            }
        }
    };
}

wire_enum!(DeploymentType {
    MigrationProject => "MIGRATION_PROJECT",
    Manual => "MANUAL",
    Csv => "CSV",
});

wire_enum!(Status {
    Pending => "PENDING",
    InProgress => "IN_PROGRESS",
    Done => "DONE",
});

/// Lenient decoders for hand-edited or form-posted snapshots
pub(crate) mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(i64),
        Text(String),
    }

    /// Number, numeric string, blank string or null
    pub(crate) fn sequence<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberOrText>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrText::Number(n)) => Ok(Some(n)),
            Some(NumberOrText::Text(text)) => parse_sequence(&text).map_err(D::Error::custom),
        }
    }

    pub(crate) fn parse_sequence(text: &str) -> Result<Option<i64>, String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        text.parse()
            .map(Some)
            .map_err(|_| format!("sequence is not a number: {text}"))
    }

    /// Wire enum, with blank string or null as absent
    pub(crate) fn choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(text) => parse_choice(&text).map_err(D::Error::custom),
        }
    }

    pub(crate) fn parse_choice<T>(text: &str) -> Result<Option<T>, String>
    where
        T: FromStr,
        T::Err: Display,
    {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        text.parse().map(Some).map_err(|e: T::Err| e.to_string())
    }

    /// String with blank or null as absent
    pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
    }
}

/// Scalar fields of a Group
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupFields {
    /// Stable external key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Display name
    #[serde(default)]
    pub label: String,
    /// Free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordering hint
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::sequence"
    )]
    pub sequence: Option<i64>,
}

impl GroupFields {
    /// Create with label
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// With external key
    #[inline]
    #[must_use]
    pub fn with_group_id(mut self, id: impl Into<String>) -> Self {
        self.group_id = Some(id.into());
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With sequence
    #[inline]
    #[must_use]
    pub fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

/// Scalar fields of an Object (everything except type and payload)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectFields {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Deployment route
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::choice"
    )]
    pub deployment_type: Option<DeploymentType>,
    /// Ordering hint
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::sequence"
    )]
    pub sequence: Option<i64>,
    /// Documentation progress
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::choice"
    )]
    pub status_documentation: Option<Status>,
    /// Deployment progress
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::choice"
    )]
    pub status_deployment: Option<Status>,
}

impl ObjectFields {
    /// Create with name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With deployment type
    #[inline]
    #[must_use]
    pub fn with_deployment_type(mut self, deployment: DeploymentType) -> Self {
        self.deployment_type = Some(deployment);
        self
    }

    /// With sequence
    #[inline]
    #[must_use]
    pub fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// With both statuses
    #[inline]
    #[must_use]
    pub fn with_status(mut self, documentation: Status, deployment: Status) -> Self {
        self.status_documentation = Some(documentation);
        self.status_deployment = Some(deployment);
        self
    }
}

/// Ordered field name → scalar value
pub type FieldValues = IndexMap<String, Value>;

/// Stored values of an Object, keyed by the shape they belong to
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPayload {
    /// Identifier fields (logical kinds, primary keys)
    Identifiers(FieldValues),
    /// Schema-backed layout fields
    Data(FieldValues),
}

impl ObjectPayload {
    /// The values regardless of shape
    #[inline]
    #[must_use]
    pub fn values(&self) -> &FieldValues {
        match self {
            Self::Identifiers(values) | Self::Data(values) => values,
        }
    }

    /// Whether values belong under `identifiers`
    #[inline]
    #[must_use]
    pub fn is_identifiers(&self) -> bool {
        matches!(self, Self::Identifiers(_))
    }

    /// Submission key: `identifiers` or `data`
    #[inline]
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Identifiers(_) => "identifiers",
            Self::Data(_) => "data",
        }
    }

    /// Split into `(identifiers, data)` snapshot slots
    #[must_use]
    pub fn into_slots(self) -> (Option<FieldValues>, Option<FieldValues>) {
        match self {
            Self::Identifiers(values) => (Some(values), None),
            Self::Data(values) => (None, Some(values)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_fields_accept_lenient_wire_values() {
        let fields: ObjectFields = serde_json::from_value(json!({
            "name": "Order releases",
            "deployment_type": "",
            "sequence": "4",
            "status_documentation": "IN_PROGRESS",
            "status_deployment": null
        }))
        .unwrap();

        assert_eq!(fields.deployment_type, None);
        assert_eq!(fields.sequence, Some(4));
        assert_eq!(fields.status_documentation, Some(Status::InProgress));
        assert_eq!(fields.status_deployment, None);
    }

    #[test]
    fn bad_sequence_is_rejected() {
        let res = serde_json::from_value::<GroupFields>(json!({"label": "A", "sequence": "first"}));
        assert!(res.is_err());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let res = serde_json::from_value::<ObjectFields>(json!({"status_deployment": "LATE"}));
        assert!(res.is_err());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let json = serde_json::to_value(GroupFields::new("Automation")).unwrap();
        assert_eq!(json, json!({"label": "Automation"}));
    }

    #[test]
    fn wire_names() {
        assert_eq!(DeploymentType::MigrationProject.to_string(), "MIGRATION_PROJECT");
        assert_eq!("CSV".parse::<DeploymentType>(), Ok(DeploymentType::Csv));
        assert_eq!("IN_PROGRESS".parse::<Status>(), Ok(Status::InProgress));
        assert!("done".parse::<Status>().is_err());
    }

    #[test]
    fn payload_slots() {
        let mut values = FieldValues::new();
        values.insert("query_name".to_string(), json!("ACTIVE_ORDERS"));
        let (identifiers, data) = ObjectPayload::Identifiers(values.clone()).into_slots();
        assert_eq!(identifiers, Some(values));
        assert_eq!(data, None);
    }
}
