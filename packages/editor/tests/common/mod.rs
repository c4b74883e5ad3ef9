//! Shared fixtures for editor integration tests

#![allow(dead_code)]

use initiative_common::ManualClock;
use initiative_editor::{Document, DocumentConfig, NodeData, Patch, PatchParent};
use initiative_expression::{ExpressionJson, SelectorJson};
use initiative_schema::{Definitions, ExtensionMethodDefinition, NodeSchema, ValueType};
use std::sync::Arc;

/// Node types used across the tests
///
/// - `Root`: single slot `child`, exposes `name`
/// - `Leaf`: inputs `label` (optional string) and `count` (number)
/// - `List`: collection slot `items` with per-item `itemLabel`, single slot
///   `header`, exposes `size` and the `items`-scoped `item`
/// - `Text`: input `text` (optional string), single slot `tooltip`
pub fn definitions() -> Arc<Definitions> {
    let mut definitions = Definitions::new();
    definitions
        .add_node(
            NodeSchema::builder("Root")
                .input("title", ValueType::optional(ValueType::String))
                .output("name", ValueType::String)
                .slot("child")
                .build()
                .unwrap(),
        )
        .unwrap();
    definitions
        .add_node(
            NodeSchema::builder("Leaf")
                .input("label", ValueType::optional(ValueType::String))
                .input("count", ValueType::Number)
                .build()
                .unwrap(),
        )
        .unwrap();
    definitions
        .add_node(
            NodeSchema::builder("@demo/lists::List")
                .output("size", ValueType::Number)
                .slot_output("item", ValueType::entity("Article"), "items")
                .collection_slot("items", [("itemLabel", ValueType::String)])
                .slot("header")
                .build()
                .unwrap(),
        )
        .unwrap();
    definitions
        .add_node(
            NodeSchema::builder("Text")
                .input("text", ValueType::optional(ValueType::String))
                .slot("tooltip")
                .build()
                .unwrap(),
        )
        .unwrap();
    definitions
        .add_extension_method(ExtensionMethodDefinition {
            name: "Article::title".to_string(),
            self_type: ValueType::entity("Article"),
            params: vec![],
            returns: ValueType::String,
        })
        .unwrap();
    Arc::new(definitions)
}

pub fn document() -> Document {
    Document::new("Test", definitions())
}

pub fn document_with_clock() -> (Document, Arc<ManualClock>) {
    document_with_config(DocumentConfig::default())
}

pub fn document_with_config(config: DocumentConfig) -> (Document, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let document = Document::with_config("Test", definitions(), config).with_clock(clock.clone());
    (document, clock)
}

pub fn string(value: &str) -> Option<ExpressionJson> {
    Some(ExpressionJson::string(value))
}

/// `<node_id>::item` followed by `Article::title`
pub fn item_title(node_id: &str) -> ExpressionJson {
    ExpressionJson::NodeOutput {
        node_id: node_id.to_string(),
        output_name: "item".to_string(),
        selectors: vec![SelectorJson::Method {
            method_name: "Article::title".to_string(),
            args: vec![],
        }],
    }
}

pub fn create_at(node_type: &str, parent_id: &str, slot_name: &str, index: u32) -> Patch {
    Patch::CreateNode {
        node_type: node_type.to_string(),
        parent: Some(PatchParent {
            node_id: parent_id.to_string(),
            slot_name: slot_name.to_string(),
            index: Some(index),
        }),
        node_id: None,
    }
}

/// A `List1` root with three `Text` items labelled `a`, `b`, `c`.
/// `Text2` reads the item title and holds `Leaf1` in its tooltip, which
/// reads the item title too and has a count.
///
/// ```text
/// List1
/// └── items
///     ├── [0] Text1
///     ├── [1] Text2 ── tooltip ── Leaf1
///     └── [2] Text3
/// ```
pub fn list_document() -> Document {
    let mut doc = document();
    populate_list(&mut doc);
    doc
}

pub fn populate_list(doc: &mut Document) {
    doc.apply_patch(Patch::create_root("@demo/lists::List")).unwrap();
    for (i, label) in ["a", "b", "c"].into_iter().enumerate() {
        doc.apply_patch(Patch::create_child("Text", "List1", "items"))
            .unwrap();
        doc.apply_patch(Patch::set_input("List1", "itemLabel", Some(i as u32), string(label)))
            .unwrap();
    }
    doc.apply_patch(Patch::set_input("Text2", "text", None, Some(item_title("List1"))))
        .unwrap();
    doc.apply_patch(Patch::create_child("Leaf", "Text2", "tooltip"))
        .unwrap();
    doc.apply_patch(Patch::set_input("Leaf1", "label", None, Some(item_title("List1"))))
        .unwrap();
    doc.apply_patch(Patch::set_input("Leaf1", "count", None, Some(ExpressionJson::number(3.0))))
        .unwrap();
}

/// Every node, breadth-first
pub fn nodes(doc: &Document) -> Vec<NodeData> {
    doc.keys()
        .iter()
        .map(|id| doc.get_node(id).unwrap().clone())
        .collect()
}
