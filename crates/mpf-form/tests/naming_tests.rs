//! Submission naming round trips

use mpf_form::prelude::*;
use mpf_form::snapshot_from_form_fields;
use mpf_test_utils::{sample_resolver, SAMPLE_SNAPSHOT_JSON};
use pretty_assertions::assert_eq;

async fn sample_tree() -> FormTree {
    let mut tree = FormTree::new(sample_resolver());
    tree.bootstrap(Some(SAMPLE_SNAPSHOT_JSON)).await;
    tree
}

#[tokio::test]
async fn test_form_fields_decode_to_serialized_snapshot() {
    let tree = sample_tree().await;

    let decoded = snapshot_from_form_fields(tree.to_form_fields()).unwrap();
    assert_eq!(decoded, tree.serialize());
}

#[tokio::test]
async fn test_form_fields_use_live_slots() {
    let mut tree = sample_tree().await;
    let first = tree.object_paths()[0];
    tree.remove_object(first).unwrap();

    let names: Vec<String> = tree.to_form_fields().into_iter().map(|(name, _)| name).collect();
    assert!(names.contains(&"groups[0][objects][1][identifiers][agent_gid]".to_string()));
    assert!(names.contains(&"groups[1][objects][0][data][ORDER_RELEASE_GID]".to_string()));
    assert!(!names.iter().any(|n| n.starts_with("groups[0][objects][0]")));

    // Gaps collapse on decode
    let decoded = snapshot_from_form_fields(tree.to_form_fields()).unwrap();
    assert_eq!(decoded.groups[0].objects.len(), 1);
    assert_eq!(decoded, tree.serialize());
}

#[tokio::test]
async fn test_decoded_snapshot_rehydrates() {
    let tree = sample_tree().await;
    let decoded = snapshot_from_form_fields(tree.to_form_fields()).unwrap();

    let mut restored = FormTree::new(sample_resolver());
    let report = restored.rehydrate(decoded).await.unwrap();

    assert!(report.failed.is_empty());
    assert_eq!(restored.serialize(), tree.serialize());
}

#[tokio::test]
async fn test_blank_values_are_not_submitted() {
    let mut tree = FormTree::new(sample_resolver());
    let group = tree.add_group();
    let path = tree.add_object(group).unwrap();
    tree.select_object_type(path, "ORDER_RELEASE").await.unwrap();

    let fields = tree.to_form_fields();
    let data: Vec<_> = fields.iter().filter(|(name, _)| name.contains("[data]")).collect();
    assert_eq!(
        data,
        vec![&(
            "groups[0][objects][0][data][PRIORITY]".to_string(),
            "1".to_string()
        )]
    );
}
