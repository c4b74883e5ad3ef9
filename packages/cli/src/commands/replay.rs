use super::load_definitions;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use initiative_editor::{input_key, Document, NodeData, Patch};
use serde_json::{json, Map, Value};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON file holding an array of patches
    pub patches: String,

    /// Definitions file (overrides config)
    #[arg(short, long)]
    pub definitions: Option<String>,

    /// Number of undo steps to perform after replaying
    #[arg(short, long, default_value_t = 0)]
    pub undo: usize,

    /// Print the resulting tree as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn replay(args: ReplayArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let definitions = load_definitions(args.definitions.as_deref(), &config, cwd)?;

    let patches_path = PathBuf::from(cwd).join(&args.patches);
    let patches = read_patches(&patches_path)?;

    let mut doc = Document::with_config(document_name(&patches_path), definitions, config.document_config());
    info!(document = %doc.name(), patches = patches.len(), "Replaying patches");

    if !args.json {
        println!("{}", "▶ Replaying patches...".bright_blue().bold());
    }

    for (i, patch) in patches.into_iter().enumerate() {
        let description = patch.to_string();
        let result = doc
            .apply_patch(patch)
            .with_context(|| format!("Patch #{} ({}) was rejected", i + 1, description))?;

        if !args.json {
            println!(
                "  {} v{} {} → {}",
                "✓".green(),
                result.version,
                description,
                result.changed_ids.join(", ").dimmed()
            );
        }
    }

    for _ in 0..args.undo {
        match doc.undo()? {
            Some(result) if !args.json => println!(
                "  {} v{} undo → {}",
                "↶".yellow(),
                result.version,
                result.changed_ids.join(", ").dimmed()
            ),
            Some(_) => {}
            None => {
                if !args.json {
                    println!("  {} nothing left to undo", "⚠️".yellow());
                }
                break;
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree_json(&doc)?)?);
    } else {
        println!();
        print!("{}", render_tree(&doc)?);
    }
    Ok(())
}

fn read_patches(path: &Path) -> Result<Vec<Patch>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let patches = serde_json::from_str(&content)
        .with_context(|| format!("Invalid patch file {}", path.display()))?;
    Ok(patches)
}

fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Indented tree: each node with its bound inputs, then its children
pub fn render_tree(doc: &Document) -> Result<String> {
    let mut out = String::new();
    match doc.root_id() {
        Some(root_id) => render_node(doc, root_id, None, 0, &mut out)?,
        None => writeln!(out, "(empty document)")?,
    }
    writeln!(out, "version {}", doc.version())?;
    Ok(out)
}

fn render_node(
    doc: &Document,
    node_id: &str,
    label: Option<String>,
    depth: usize,
    out: &mut String,
) -> Result<()> {
    let node = doc.get_node(node_id)?;
    let indent = "  ".repeat(depth);

    match label {
        Some(label) => writeln!(out, "{}{}: {} ({})", indent, label, node.id(), node.node_type())?,
        None => writeln!(out, "{}{} ({})", indent, node.id(), node.node_type())?,
    }

    for (input_name, index, expression) in node.bound_inputs() {
        writeln!(
            out,
            "{}  {} = {}",
            indent,
            input_key(&input_name, index),
            serde_json::to_string(&expression.to_json())?
        )?;
    }

    let children = node.for_each_slot(|child_id, slot_name, index| {
        let label = match index {
            Some(index) => format!("{}[{}]", slot_name, index),
            None => slot_name.to_string(),
        };
        (child_id.to_string(), label)
    });
    for (child_id, label) in children {
        render_node(doc, &child_id, Some(label), depth + 1, out)?;
    }
    Ok(())
}

/// Breadth-first node listing
pub fn tree_json(doc: &Document) -> Result<Value> {
    let nodes = doc
        .keys()
        .iter()
        .map(|id| node_json(doc.get_node(id)?))
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "name": doc.name(),
        "version": doc.version(),
        "rootId": doc.root_id(),
        "nodes": nodes,
    }))
}

fn node_json(node: &NodeData) -> Result<Value> {
    let mut inputs = Map::new();
    for (input_name, index, expression) in node.bound_inputs() {
        inputs.insert(
            input_key(&input_name, index),
            serde_json::to_value(expression.to_json())?,
        );
    }

    let parent = node.parent().map(|parent| {
        json!({
            "nodeId": parent.node_id,
            "slotName": parent.slot_name,
            "index": parent.index,
        })
    });

    Ok(json!({
        "id": node.id(),
        "type": node.node_type(),
        "parent": parent,
        "inputs": inputs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use initiative_expression::ExpressionJson;
    use initiative_schema::{Definitions, NodeSchema, ValueType};
    use std::sync::Arc;

    fn document() -> Document {
        let definitions = Definitions::new()
            .with_node(
                NodeSchema::builder("Stack")
                    .collection_slot("child", [("grow", ValueType::Number)])
                    .build()
                    .unwrap(),
            )
            .and_then(|d| {
                d.with_node(
                    NodeSchema::builder("Text")
                        .input("text", ValueType::String)
                        .build()
                        .unwrap(),
                )
            })
            .unwrap();

        let mut doc = Document::new("Demo", Arc::new(definitions));
        doc.apply_patch(Patch::create_root("Stack")).unwrap();
        doc.apply_patch(Patch::create_child("Text", "Stack1", "child"))
            .unwrap();
        doc.apply_patch(Patch::set_input(
            "Text1",
            "text",
            None,
            Some(ExpressionJson::string("Hi")),
        ))
        .unwrap();
        doc.apply_patch(Patch::set_input(
            "Stack1",
            "grow",
            Some(0),
            Some(ExpressionJson::number(1.0)),
        ))
        .unwrap();
        doc
    }

    #[test]
    fn test_render_tree() {
        let rendered = render_tree(&document()).unwrap();
        assert_eq!(
            rendered,
            concat!(
                "Stack1 (Stack)\n",
                "  grow::0 = {\"type\":\"number-literal\",\"value\":1.0}\n",
                "  child[0]: Text1 (Text)\n",
                "    text = {\"type\":\"string-literal\",\"value\":\"Hi\"}\n",
                "version 4\n",
            )
        );
    }

    #[test]
    fn test_render_empty_tree() {
        let definitions = Arc::new(Definitions::new());
        let doc = Document::new("Empty", definitions);
        assert_eq!(render_tree(&doc).unwrap(), "(empty document)\nversion 0\n");
    }

    #[test]
    fn test_tree_json() {
        let value = tree_json(&document()).unwrap();

        assert_eq!(value["rootId"], "Stack1");
        assert_eq!(value["nodes"][1]["id"], "Text1");
        assert_eq!(value["nodes"][1]["parent"]["index"], 0);
        assert_eq!(value["nodes"][0]["inputs"]["grow::0"]["value"], 1.0);
    }

    #[test]
    fn test_demo_script_replays_against_sample_definitions() {
        let definitions = Definitions::from_json_str(super::super::init::SAMPLE_DEFINITIONS).unwrap();
        let patches: Vec<Patch> =
            serde_json::from_str(include_str!("../../../../demos/patches.json")).unwrap();

        let mut doc = Document::new("patches", Arc::new(definitions));
        for patch in patches {
            doc.apply_patch(patch).unwrap();
        }

        assert_eq!(doc.keys(), vec!["ArticleRepository1", "ArticleList", "Typography1"]);
        let rendered = render_tree(&doc).unwrap();
        assert!(rendered.contains("  child: ArticleList (@demo/mui::List)\n"));
        assert!(rendered.contains("    renderItem: Typography1 (@demo/mui::Typography)\n"));
        assert!(rendered.contains("\"nodeId\":\"ArticleList\""));
    }

    #[test]
    fn test_document_name_from_file_stem() {
        assert_eq!(document_name(Path::new("demos/patches.json")), "patches");
    }
}
