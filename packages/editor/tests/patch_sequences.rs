//! Multi-patch sequences: renames, index shifts, JSON patch scripts

mod common;

use common::*;
use initiative_editor::{DocumentError, Patch, SlotChildren};
use initiative_expression::{Expression, ExpressionJson};

fn node_output_target(doc: &initiative_editor::Document, node_id: &str, input: &str) -> String {
    match doc
        .get_node(node_id)
        .unwrap()
        .input(input, None)
        .map(Expression::to_json)
    {
        Some(ExpressionJson::NodeOutput { node_id, .. }) => node_id,
        other => panic!("expected a node-output binding, got {:?}", other),
    }
}

#[test]
fn test_rename_cascades_to_descendant_bindings() {
    let mut doc = list_document();

    let result = doc.apply_patch(Patch::rename("List1", "Menu")).unwrap();

    assert_eq!(doc.root_id(), Some("Menu"));
    assert!(!doc.has_node("List1"));
    assert_eq!(node_output_target(&doc, "Text2", "text"), "Menu");
    assert_eq!(node_output_target(&doc, "Leaf1", "label"), "Menu");
    for id in ["List1", "Menu", "Text1", "Text2", "Text3", "Leaf1"] {
        assert!(result.changed_ids.contains(&id.to_string()), "{}", id);
    }
    for id in ["Text1", "Text2", "Text3"] {
        assert_eq!(doc.get_node(id).unwrap().parent().unwrap().node_id, "Menu");
    }
}

#[test]
fn test_rename_round_trip_restores_everything() {
    let mut doc = list_document();
    let before = nodes(&doc);

    doc.apply_patch(Patch::rename("List1", "Menu")).unwrap();
    doc.apply_patch(Patch::rename("Menu", "List1")).unwrap();

    assert_eq!(nodes(&doc), before);
}

#[test]
fn test_rename_inner_node_updates_parent_slot() {
    let mut doc = list_document();
    doc.apply_patch(Patch::rename("Text2", "Title")).unwrap();

    assert_eq!(
        doc.get_node("List1").unwrap().slot("items").unwrap(),
        &SlotChildren::Collection(vec![
            "Text1".to_string(),
            "Title".to_string(),
            "Text3".to_string()
        ])
    );
    assert_eq!(doc.get_node("Leaf1").unwrap().parent().unwrap().node_id, "Title");
    // Leaf1 reads List1, which kept its id
    assert_eq!(node_output_target(&doc, "Leaf1", "label"), "List1");
    let ancestors = doc.get_ancestors("Leaf1").unwrap();
    assert_eq!(ancestors[0].node_id, "List1");
    assert_eq!(ancestors[1].node_id, "Title");
    assert_eq!(ancestors[1].slot_name, "tooltip");
}

#[test]
fn test_rename_to_existing_id_is_rejected() {
    let mut doc = list_document();
    let version = doc.version();

    assert_eq!(
        doc.apply_patch(Patch::rename("Text1", "Text2")),
        Err(DocumentError::IdAlreadyExists {
            node_id: "Text2".to_string()
        })
    );
    assert_eq!(doc.version(), version);
    assert!(doc.has_node("Text1"));
}

#[test]
fn test_removing_item_shifts_later_items_down() {
    let mut doc = document();
    doc.apply_patch(Patch::create_root("@demo/lists::List"))
        .unwrap();
    for i in 0..5u32 {
        doc.apply_patch(Patch::create_child("Text", "List1", "items"))
            .unwrap();
        doc.apply_patch(Patch::set_input(
            "List1",
            "itemLabel",
            Some(i),
            string(&format!("label{}", i + 1)),
        ))
        .unwrap();
    }

    doc.apply_patch(Patch::delete("Text2")).unwrap();

    let list = doc.get_node("List1").unwrap();
    assert_eq!(list.child_ids(), vec!["Text1", "Text3", "Text4", "Text5"]);
    for (index, id) in ["Text1", "Text3", "Text4", "Text5"].into_iter().enumerate() {
        let parent = doc.get_node(id).unwrap().parent().unwrap().clone();
        assert_eq!(parent.index, Some(index as u32));
        assert_eq!(
            list.input("itemLabel", Some(index as u32)).map(Expression::to_json),
            string(&format!("label{}", id.trim_start_matches("Text")))
        );
    }
}

#[test]
fn test_item_input_requires_existing_item() {
    let mut doc = document();
    doc.apply_patch(Patch::create_root("@demo/lists::List"))
        .unwrap();

    assert!(matches!(
        doc.apply_patch(Patch::set_input("List1", "itemLabel", Some(0), string("x"))),
        Err(DocumentError::Node(_))
    ));
}

#[test]
fn test_clear_input_with_null_expression() {
    let mut doc = list_document();
    doc.apply_patch(Patch::set_input("Leaf1", "label", None, None))
        .unwrap();

    assert_eq!(doc.get_node("Leaf1").unwrap().input("label", None), None);
    doc.undo().unwrap();
    assert!(doc.get_node("Leaf1").unwrap().input("label", None).is_some());
}

#[test]
fn test_replay_json_patch_script() {
    let script = r#"[
        { "type": "create-node", "nodeType": "Root" },
        { "type": "create-node", "nodeType": "Leaf", "parent": { "nodeId": "Root1", "slotName": "child" } },
        { "type": "set-node-input", "nodeId": "Leaf1", "inputName": "count",
          "expression": { "type": "number-literal", "value": 2 } },
        { "type": "rename-node", "nodeId": "Leaf1", "newId": "Counter" }
    ]"#;
    let patches: Vec<Patch> = serde_json::from_str(script).unwrap();

    let mut doc = document();
    for patch in patches {
        doc.apply_patch(patch).unwrap();
    }

    assert_eq!(doc.version(), 4);
    assert_eq!(doc.keys(), vec!["Root1", "Counter"]);
    assert_eq!(
        doc.get_node("Counter").unwrap().input("count", None),
        Some(&Expression::NumberLiteral(2.0))
    );
}
