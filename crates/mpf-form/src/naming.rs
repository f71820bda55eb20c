//! Submission field naming
//!
//! The page posts the tree as flat `name=value` pairs:
//!
//! ```text
//! groups[g][label]
//! groups[g][objects][o][object_type]
//! groups[g][objects][o][identifiers][column]
//! groups[g][objects][o][data][field]
//! ```
//!
//! `g` and `o` are live slots, so gaps left by removals are expected.
//! [`snapshot_from_form_fields`] reads the same convention back.

use crate::error::{FormError, FormResult};
use crate::model::{lenient, FieldValues, GroupFields, ObjectFields};
use crate::snapshot::{GroupSnapshot, ObjectSnapshot, ProjectSnapshot};
use crate::tree::FormTree;
use mpf_schema::validate::scalar_text;
use serde_json::Value;
use std::collections::BTreeMap;

fn push(fields: &mut Vec<(String, String)>, name: String, value: impl Into<String>) {
    fields.push((name, value.into()));
}

fn push_group(fields: &mut Vec<(String, String)>, prefix: &str, group: &GroupFields) {
    if let Some(id) = &group.group_id {
        push(fields, format!("{prefix}[group_id]"), id.as_str());
    }
    push(fields, format!("{prefix}[label]"), group.label.as_str());
    if let Some(description) = &group.description {
        push(fields, format!("{prefix}[description]"), description.as_str());
    }
    if let Some(sequence) = group.sequence {
        push(fields, format!("{prefix}[sequence]"), sequence.to_string());
    }
}

fn push_object(fields: &mut Vec<(String, String)>, prefix: &str, object: &ObjectSnapshot) {
    let scalars = &object.fields;
    push(fields, format!("{prefix}[name]"), scalars.name.as_str());
    if let Some(description) = &scalars.description {
        push(fields, format!("{prefix}[description]"), description.as_str());
    }
    if let Some(object_type) = &object.object_type {
        push(fields, format!("{prefix}[object_type]"), object_type.as_str());
    }
    if let Some(deployment) = scalars.deployment_type {
        push(fields, format!("{prefix}[deployment_type]"), deployment.as_str());
    }
    if let Some(sequence) = scalars.sequence {
        push(fields, format!("{prefix}[sequence]"), sequence.to_string());
    }
    if let Some(status) = scalars.status_documentation {
        push(fields, format!("{prefix}[status_documentation]"), status.as_str());
    }
    if let Some(status) = scalars.status_deployment {
        push(fields, format!("{prefix}[status_deployment]"), status.as_str());
    }

    for (key, values) in [("identifiers", &object.identifiers), ("data", &object.data)] {
        for (name, value) in values.iter().flatten() {
            push(fields, format!("{prefix}[{key}][{name}]"), scalar_text(value));
        }
    }
}

impl FormTree {
    /// Submission pairs for the whole tree, addressed by live slots
    #[must_use]
    pub fn to_form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();

        for (slot, group) in self.groups() {
            let prefix = slot.to_string();
            push_group(&mut fields, &prefix, group.fields());

            for (object_slot, object) in group.objects() {
                let object_prefix = format!("{prefix}[objects][{}]", object_slot.get());
                push_object(&mut fields, &object_prefix, &object.to_snapshot());
            }
        }

        fields
    }
}

/// Split `head[a][b]...` into `head` and its bracketed segments
fn segments(name: &str) -> Option<(&str, Vec<&str>)> {
    let open = name.find('[')?;
    let (head, mut rest) = name.split_at(open);
    let mut parts = Vec::new();

    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        parts.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    Some((head, parts))
}

fn index(name: &str, raw: &str) -> FormResult<u32> {
    raw.parse()
        .map_err(|_| FormError::invalid_field(name, format!("index is not a slot number: {raw:?}")))
}

#[derive(Default)]
struct ObjectDraft {
    fields: ObjectFields,
    object_type: Option<String>,
    identifiers: Option<FieldValues>,
    data: Option<FieldValues>,
}

#[derive(Default)]
struct GroupDraft {
    fields: GroupFields,
    objects: BTreeMap<u32, ObjectDraft>,
}

fn set_group_field(group: &mut GroupFields, name: &str, key: &str, value: &str) -> FormResult<()> {
    match key {
        "group_id" => group.group_id = Some(value.to_string()),
        "label" => group.label = value.to_string(),
        "description" => group.description = Some(value.to_string()),
        "sequence" => {
            group.sequence = lenient::parse_sequence(value).map_err(|e| FormError::invalid_field(name, e))?;
        }
        _ => tracing::debug!(name, "unknown group field ignored"),
    }
    Ok(())
}

fn set_object_field(object: &mut ObjectDraft, name: &str, key: &str, value: &str) -> FormResult<()> {
    let invalid = |e: String| FormError::invalid_field(name, e);
    let scalars = &mut object.fields;

    match key {
        "name" => scalars.name = value.to_string(),
        "description" => scalars.description = Some(value.to_string()),
        "object_type" => object.object_type = Some(value.trim().to_string()).filter(|t| !t.is_empty()),
        "deployment_type" => scalars.deployment_type = lenient::parse_choice(value).map_err(invalid)?,
        "sequence" => scalars.sequence = lenient::parse_sequence(value).map_err(invalid)?,
        "status_documentation" => scalars.status_documentation = lenient::parse_choice(value).map_err(invalid)?,
        "status_deployment" => scalars.status_deployment = lenient::parse_choice(value).map_err(invalid)?,
        _ => tracing::debug!(name, "unknown object field ignored"),
    }
    Ok(())
}

/// Rebuild a snapshot from submitted pairs
///
/// Groups and Objects come out in slot order. Names outside `groups[...]`
/// and unknown keys are ignored; values come back as text.
///
/// # Errors
/// `FormError::InvalidFormField` for a `groups[...]` name with malformed
/// brackets or a non-numeric slot, or an unparseable sequence or enum value
pub fn snapshot_from_form_fields<I, K, V>(pairs: I) -> FormResult<ProjectSnapshot>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut groups: BTreeMap<u32, GroupDraft> = BTreeMap::new();

    for (name, value) in pairs {
        let (name, value) = (name.as_ref(), value.as_ref());
        if !name.starts_with("groups[") {
            continue;
        }

        let (head, parts) =
            segments(name).ok_or_else(|| FormError::invalid_field(name, "unbalanced brackets"))?;
        if head != "groups" {
            continue;
        }

        match parts.as_slice() {
            [g, key] => {
                let group = groups.entry(index(name, g)?).or_default();
                set_group_field(&mut group.fields, name, key, value)?;
            }
            [g, "objects", o, key] => {
                let group = groups.entry(index(name, g)?).or_default();
                let object = group.objects.entry(index(name, o)?).or_default();
                set_object_field(object, name, key, value)?;
            }
            [g, "objects", o, kind @ ("identifiers" | "data"), field] => {
                let group = groups.entry(index(name, g)?).or_default();
                let object = group.objects.entry(index(name, o)?).or_default();
                let target = if *kind == "identifiers" {
                    &mut object.identifiers
                } else {
                    &mut object.data
                };
                target
                    .get_or_insert_with(FieldValues::new)
                    .insert((*field).to_string(), Value::String(value.to_string()));
            }
            _ => tracing::debug!(name, "unrecognised form field ignored"),
        }
    }

    Ok(ProjectSnapshot {
        groups: groups
            .into_values()
            .map(|group| GroupSnapshot {
                fields: group.fields,
                objects: group
                    .objects
                    .into_values()
                    .map(|object| ObjectSnapshot {
                        fields: object.fields,
                        object_type: object.object_type,
                        legacy_type: None,
                        identifiers: object.identifiers,
                        data: object.data,
                    })
                    .collect(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeploymentType, Status};
    use pretty_assertions::assert_eq;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn segments_split_brackets() {
        assert_eq!(
            segments("groups[0][objects][3][data][A_GID]"),
            Some(("groups", vec!["0", "objects", "3", "data", "A_GID"]))
        );
        assert_eq!(segments("groups[0"), None);
        assert_eq!(segments("plain"), None);
    }

    #[test]
    fn decodes_sparse_slots_in_order() {
        let snapshot = snapshot_from_form_fields(pairs(&[
            ("groups[4][label]", "Second"),
            ("groups[1][label]", "First"),
            ("groups[1][objects][7][name]", "late"),
            ("groups[1][objects][2][name]", "early"),
            ("groups[1][objects][2][object_type]", "SAVED_QUERY"),
            ("groups[1][objects][2][identifiers][query_name]", "ACTIVE_ORDERS"),
            ("groups[1][objects][2][deployment_type]", "CSV"),
            ("groups[1][objects][2][status_deployment]", ""),
            ("groups[1][objects][2][sequence]", "3"),
            ("version_control_author", "ana"),
            ("change_history[0][date]", "01/01/2024"),
        ]))
        .unwrap();

        assert_eq!(snapshot.groups.len(), 2);
        assert_eq!(snapshot.groups[0].fields.label, "First");
        assert_eq!(snapshot.groups[1].fields.label, "Second");

        let objects = &snapshot.groups[0].objects;
        assert_eq!(objects[0].fields.name, "early");
        assert_eq!(objects[1].fields.name, "late");
        assert_eq!(objects[0].object_type.as_deref(), Some("SAVED_QUERY"));
        assert_eq!(objects[0].fields.deployment_type, Some(DeploymentType::Csv));
        assert_eq!(objects[0].fields.status_deployment, None::<Status>);
        assert_eq!(objects[0].fields.sequence, Some(3));
        assert_eq!(
            objects[0].identifiers.as_ref().unwrap()["query_name"],
            Value::String("ACTIVE_ORDERS".to_string())
        );
    }

    #[test]
    fn rejects_malformed_indices() {
        let err = snapshot_from_form_fields(pairs(&[("groups[x][label]", "A")])).unwrap_err();
        assert!(matches!(err, FormError::InvalidFormField { .. }));

        let err = snapshot_from_form_fields(pairs(&[("groups[0][objects][-1][name]", "A")])).unwrap_err();
        assert!(matches!(err, FormError::InvalidFormField { .. }));

        let err = snapshot_from_form_fields(pairs(&[("groups[0][label", "A")])).unwrap_err();
        assert!(matches!(err, FormError::InvalidFormField { .. }));
    }

    #[test]
    fn rejects_bad_enum_values() {
        let err = snapshot_from_form_fields(pairs(&[("groups[0][objects][0][status_documentation]", "LATE")]))
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidFormField { .. }));
    }

    #[test]
    fn ignores_unknown_keys() {
        let snapshot = snapshot_from_form_fields(pairs(&[
            ("groups[0][label]", "A"),
            ("groups[0][color]", "blue"),
            ("groups[0][objects][0][extra][x][y]", "z"),
        ]))
        .unwrap();
        assert_eq!(snapshot.groups[0].fields, GroupFields::new("A"));
    }
}
