//! View model for drawing the form
//!
//! [`FormTree::render`] flattens the tree into serializable views carrying
//! everything a page needs per input: submission name, label, input kind,
//! current value and help text. Objects also carry a [`ShapeStatus`] so a
//! failed lookup shows inline next to its own Object.

use crate::allocator::{GroupSlot, ObjectPath};
use crate::shape::{ObjectShape, RenderedFields};
use crate::tree::{FormTree, GroupNode, ObjectNode};
use mpf_schema::validate::scalar_text;
use mpf_schema::{FieldDescriptor, FieldType, ResolvedShape};
use serde::Serialize;

/// Title of the section holding identifier inputs
pub const IDENTIFIER_SECTION: &str = "Identifiers";

/// One Group as drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    /// Slot
    pub slot: GroupSlot,
    /// Submission prefix, `groups[g]`
    pub prefix: String,
    /// Display name
    pub label: String,
    /// Objects in display order
    pub objects: Vec<ObjectView>,
}

/// One Object as drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectView {
    /// Address
    pub path: ObjectPath,
    /// Submission prefix, `groups[g][objects][o]`
    pub prefix: String,
    /// Display name
    pub name: String,
    /// Selected type token
    pub object_type: Option<String>,
    /// Resolution indicator
    pub status: ShapeStatus,
    /// Rendered inputs, grouped by section
    pub sections: Vec<SectionView>,
}

/// Resolution indicator of an Object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ShapeStatus {
    /// Nothing selected yet
    NoTypeSelected,
    /// Registry lookup in flight
    Loading,
    /// Inputs rendered
    Ready,
    /// Layout could not be loaded
    Error(String),
    /// Table has no primary key; identifier entry blocked
    NoPrimaryKey(String),
}

impl ShapeStatus {
    fn of(shape: &ObjectShape) -> Self {
        match shape {
            ObjectShape::Unselected => Self::NoTypeSelected,
            ObjectShape::Pending { .. } => Self::Loading,
            ObjectShape::Ready(_) => Self::Ready,
            ObjectShape::Failed { error, .. } if error.blocks_identifiers() => {
                Self::NoPrimaryKey(error.to_string())
            }
            ObjectShape::Failed { error, .. } => Self::Error(error.to_string()),
        }
    }
}

/// A titled run of inputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    /// Section title
    pub title: String,
    /// Inputs in layout order
    pub inputs: Vec<InputView>,
}

/// One input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputView {
    /// Full submission name
    pub name: String,
    /// Field key under `identifiers` or `data`
    pub field: String,
    /// Display label
    pub label: String,
    /// Widget to draw
    pub kind: InputKind,
    /// Marked as required
    pub required: bool,
    /// Current value as text
    pub value: String,
    /// Allowed values, range or lookup note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Widget for an input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    /// Single-line text
    Text {
        /// Length limit
        max_length: Option<u32>,
    },
    /// Numeric input
    Number {
        /// Lower bound
        min: Option<f64>,
        /// Upper bound
        max: Option<f64>,
    },
    /// Date picker
    Date,
    /// Checkbox
    Checkbox,
    /// Drop-down
    Select {
        /// Choices
        options: Vec<String>,
    },
}

impl InputKind {
    /// Widget for a layout field; an options constraint always makes a select
    #[must_use]
    pub fn for_field(field: &FieldDescriptor) -> Self {
        let constraint = field.constraint.as_ref();
        let options = constraint.map(|c| c.allowed()).unwrap_or_default();
        if !options.is_empty() {
            return Self::Select {
                options: options.to_vec(),
            };
        }

        match field.field_type {
            FieldType::Text => Self::Text {
                max_length: field.max_length,
            },
            FieldType::Number => Self::Number {
                min: constraint.and_then(|c| c.min),
                max: constraint.and_then(|c| c.max),
            },
            FieldType::Date => Self::Date,
            FieldType::Boolean => Self::Checkbox,
            FieldType::Select => Self::Select { options: Vec::new() },
        }
    }
}

fn sections(prefix: &str, rendered: &RenderedFields) -> Vec<SectionView> {
    let value = |name: &str| rendered.value(name).map(scalar_text).unwrap_or_default();

    match rendered.shape() {
        ResolvedShape::Identifiers { columns, .. } => vec![SectionView {
            title: IDENTIFIER_SECTION.to_string(),
            inputs: columns
                .iter()
                .map(|column| InputView {
                    name: format!("{prefix}[identifiers][{column}]"),
                    field: column.clone(),
                    label: column.clone(),
                    kind: InputKind::Text { max_length: None },
                    required: true,
                    value: value(column),
                    help: None,
                })
                .collect(),
        }],
        ResolvedShape::Data { schema, .. } => schema
            .sections
            .iter()
            .map(|(title, fields)| SectionView {
                title: title.clone(),
                inputs: fields
                    .iter()
                    .map(|field| InputView {
                        name: format!("{prefix}[data][{}]", field.name),
                        field: field.name.clone(),
                        label: field.display_label().to_string(),
                        kind: InputKind::for_field(field),
                        required: field.required,
                        value: value(&field.name),
                        help: field.help_text(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn object_view(path: ObjectPath, node: &ObjectNode) -> ObjectView {
    let prefix = path.to_string();
    let sections = node
        .shape()
        .rendered()
        .map(|rendered| sections(&prefix, rendered))
        .unwrap_or_default();

    ObjectView {
        path,
        name: node.fields().name.clone(),
        object_type: node.object_type().map(str::to_string),
        status: ShapeStatus::of(node.shape()),
        sections,
        prefix,
    }
}

fn group_view(slot: GroupSlot, node: &GroupNode) -> GroupView {
    GroupView {
        slot,
        prefix: slot.to_string(),
        label: node.fields().label.clone(),
        objects: node
            .objects()
            .map(|(object, n)| object_view(ObjectPath::new(slot, object), n))
            .collect(),
    }
}

impl FormTree {
    /// Views for every Group in display order
    #[must_use]
    pub fn render(&self) -> Vec<GroupView> {
        self.groups().map(|(slot, node)| group_view(slot, node)).collect()
    }
}
