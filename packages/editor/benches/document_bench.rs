use criterion::{black_box, criterion_group, criterion_main, Criterion};
use initiative_editor::{Document, Patch};
use initiative_expression::ExpressionJson;
use initiative_schema::{Definitions, NodeSchema, ValueType};
use std::sync::Arc;

fn definitions() -> Arc<Definitions> {
    let list = NodeSchema::builder("List")
        .output("size", ValueType::Number)
        .collection_slot("items", [("itemLabel", ValueType::String)])
        .build()
        .unwrap();
    let text = NodeSchema::builder("Text")
        .input("text", ValueType::optional(ValueType::String))
        .build()
        .unwrap();

    Arc::new(
        Definitions::new()
            .with_node(list)
            .and_then(|d| d.with_node(text))
            .unwrap(),
    )
}

fn list_with_items(definitions: &Arc<Definitions>, count: u32) -> Document {
    let mut doc = Document::new("Bench", definitions.clone());
    doc.apply_patch(Patch::create_root("List")).unwrap();
    for i in 0..count {
        doc.apply_patch(Patch::create_child("Text", "List1", "items"))
            .unwrap();
        doc.apply_patch(Patch::set_input(
            "List1",
            "itemLabel",
            Some(i),
            Some(ExpressionJson::string(format!("item {}", i))),
        ))
        .unwrap();
    }
    doc
}

fn apply_create_patches(c: &mut Criterion) {
    let definitions = definitions();

    c.bench_function("create_100_items", |b| {
        b.iter(|| list_with_items(black_box(&definitions), 100))
    });
}

fn delete_and_undo(c: &mut Criterion) {
    let definitions = definitions();
    let mut doc = list_with_items(&definitions, 100);

    c.bench_function("delete_root_and_undo_100_items", |b| {
        b.iter(|| {
            doc.apply_patch(black_box(Patch::delete("List1"))).unwrap();
            doc.undo().unwrap()
        })
    });
}

fn rename_root(c: &mut Criterion) {
    let definitions = definitions();
    let mut doc = list_with_items(&definitions, 100);

    c.bench_function("rename_root_round_trip", |b| {
        b.iter(|| {
            doc.apply_patch(Patch::rename("List1", "Menu")).unwrap();
            doc.apply_patch(Patch::rename("Menu", "List1")).unwrap()
        })
    });
}

criterion_group!(benches, apply_create_patches, delete_and_undo, rename_root);
criterion_main!(benches);
