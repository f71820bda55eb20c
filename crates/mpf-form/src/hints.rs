//! Advisory diagnostics
//!
//! Hints point at incomplete or suspicious input. They never block an
//! operation or a submission.

use crate::allocator::{GroupSlot, ObjectPath};
use crate::shape::ObjectShape;
use crate::tree::FormTree;
use mpf_schema::validate::{check_value, is_blank};
use mpf_schema::{FieldIssue, ResolvedShape};
use serde_json::Value;
use std::fmt;

/// One non-blocking diagnostic
#[derive(Debug, Clone, PartialEq)]
pub enum FormHint {
    /// Group has no label
    MissingGroupLabel {
        /// Group
        group: GroupSlot,
    },
    /// Object has no type selected
    MissingObjectType {
        /// Object
        path: ObjectPath,
    },
    /// Identifier input left blank, for logical kinds and primary keys alike
    MissingIdentifier {
        /// Object
        path: ObjectPath,
        /// Identifier field
        field: String,
    },
    /// Layout field value does not fit its descriptor
    Field {
        /// Object
        path: ObjectPath,
        /// What is wrong
        issue: FieldIssue,
    },
}

impl fmt::Display for FormHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingGroupLabel { group } => write!(f, "{group}: group label is empty"),
            Self::MissingObjectType { path } => write!(f, "{path}: no object type selected"),
            Self::MissingIdentifier { path, field } => write!(f, "{path}: {field} is empty"),
            Self::Field { path, issue } => write!(f, "{path}: {issue}"),
        }
    }
}

impl FormTree {
    /// Every advisory hint, in display order
    #[must_use]
    pub fn hints(&self) -> Vec<FormHint> {
        let mut hints = Vec::new();

        for (group, node) in self.groups() {
            if node.fields().label.trim().is_empty() {
                hints.push(FormHint::MissingGroupLabel { group });
            }

            for (slot, object) in node.objects() {
                let path = ObjectPath::new(group, slot);

                if object.object_type().is_none() {
                    hints.push(FormHint::MissingObjectType { path });
                    continue;
                }

                let ObjectShape::Ready(rendered) = object.shape() else {
                    continue;
                };

                match rendered.shape() {
                    ResolvedShape::Identifiers { columns, .. } => {
                        for column in columns {
                            if rendered.value(column).map_or(true, is_blank) {
                                hints.push(FormHint::MissingIdentifier {
                                    path,
                                    field: column.clone(),
                                });
                            }
                        }
                    }
                    ResolvedShape::Data { schema, .. } => {
                        for field in schema.fields() {
                            let value = rendered.value(&field.name).unwrap_or(&Value::Null);
                            if let Err(issue) = check_value(field, value) {
                                hints.push(FormHint::Field { path, issue });
                            }
                        }
                    }
                }
            }
        }

        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GroupFields;
    use mpf_schema::{
        FieldDescriptor, FieldType, ResolverConfig, SchemaBackedShape, SchemaDescriptor, SchemaResolver,
        StaticSchemaRegistry, TableFixture,
    };
    use std::sync::Arc;

    fn tree_with(config: ResolverConfig) -> FormTree {
        let schema = SchemaDescriptor::default().with_section(
            "CORE",
            vec![
                FieldDescriptor::new("RATE_GEO_GID").required(),
                FieldDescriptor::new("MIN_COST").with_type(FieldType::Number),
            ],
        );
        let registry = StaticSchemaRegistry::new().with_table(
            "RATE_GEO",
            TableFixture::from_schema(&schema).with_primary_key(["RATE_GEO_GID"]),
        );
        FormTree::new(Arc::new(SchemaResolver::with_config(Arc::new(registry), config)))
    }

    fn tree() -> FormTree {
        tree_with(ResolverConfig::new())
    }

    #[test]
    fn empty_tree_has_no_hints() {
        assert!(tree().hints().is_empty());
    }

    #[test]
    fn missing_label_and_type() {
        let mut tree = tree();
        let g = tree.add_group();
        let path = tree.add_object(g).unwrap();

        let hints = tree.hints();
        assert_eq!(
            hints,
            vec![
                FormHint::MissingGroupLabel { group: g },
                FormHint::MissingObjectType { path },
            ]
        );
        assert_eq!(hints[1].to_string(), "groups[0][objects][0]: no object type selected");
    }

    #[test]
    fn logical_identifier_missing() {
        let mut tree = tree();
        let g = tree.add_group();
        tree.update_group(g, GroupFields::new("Agents")).unwrap();
        let path = tree.add_object(g).unwrap();
        tree.set_object_type(path, "AGENT").unwrap();

        assert_eq!(
            tree.hints(),
            vec![FormHint::MissingIdentifier {
                path,
                field: "agent_gid".to_string()
            }]
        );

        tree.set_field_value(path, "agent_gid", "BR.NOTIFY_DRIVER").unwrap();
        assert!(tree.hints().is_empty());
    }

    #[tokio::test]
    async fn layout_violations_are_reported_not_enforced() {
        let mut tree = tree();
        let g = tree.add_group();
        tree.update_group(g, GroupFields::new("Rates")).unwrap();
        let path = tree.add_object(g).unwrap();
        tree.select_object_type(path, "RATE_GEO").await.unwrap();
        tree.set_field_value(path, "MIN_COST", "cheap").unwrap();

        let hints = tree.hints();
        assert_eq!(hints.len(), 2);
        assert!(matches!(&hints[0], FormHint::Field { issue: FieldIssue::Required { .. }, .. }));
        assert!(matches!(&hints[1], FormHint::Field { issue: FieldIssue::NotANumber { .. }, .. }));
    }

    #[tokio::test]
    async fn primary_key_identifier_missing() {
        let mut tree = tree_with(ResolverConfig::new().with_schema_backed_shape(SchemaBackedShape::PrimaryKey));
        let g = tree.add_group();
        tree.update_group(g, GroupFields::new("Rates")).unwrap();
        let path = tree.add_object(g).unwrap();
        tree.select_object_type(path, "RATE_GEO").await.unwrap();

        let hints = tree.hints();
        assert_eq!(
            hints,
            vec![FormHint::MissingIdentifier {
                path,
                field: "RATE_GEO_GID".to_string()
            }]
        );
        assert_eq!(hints[0].to_string(), "groups[0][objects][0]: RATE_GEO_GID is empty");

        tree.set_field_value(path, "RATE_GEO_GID", "BR.LANE_01").unwrap();
        assert!(tree.hints().is_empty());
    }
}
