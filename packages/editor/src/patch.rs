//! # Patches
//!
//! Atomic edit intents submitted to a [`crate::Document`].
//!
//! Patches travel as tagged JSON:
//!
//! ```json
//! { "type": "create-node", "nodeType": "Leaf", "parent": { "nodeId": "Root1", "slotName": "child" } }
//! { "type": "set-node-input", "nodeId": "Leaf1", "inputName": "label",
//!   "expression": { "type": "string-literal", "value": "Hi" } }
//! ```
//!
//! Undo entries are patches too, so every variant must be able to express the
//! inverse of another.

use initiative_expression::ExpressionJson;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a new node is attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchParent {
    pub node_id: String,
    pub slot_name: String,

    /// Insert position within a collection slot; appended when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Patch {
    /// Create a node; without a parent it becomes the root of an empty document
    #[serde(rename_all = "camelCase")]
    CreateNode {
        node_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<PatchParent>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
    },

    /// Delete a node and its whole subtree
    #[serde(rename_all = "camelCase")]
    DeleteNode { node_id: String },

    #[serde(rename_all = "camelCase")]
    RenameNode { node_id: String, new_id: String },

    /// Bind (or clear, when `expression` is null) one input
    #[serde(rename_all = "camelCase")]
    SetNodeInput {
        node_id: String,
        input_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<u32>,
        expression: Option<ExpressionJson>,
    },
}

impl Patch {
    pub fn create_root(node_type: impl Into<String>) -> Self {
        Patch::CreateNode {
            node_type: node_type.into(),
            parent: None,
            node_id: None,
        }
    }

    pub fn create_child(
        node_type: impl Into<String>,
        parent_id: impl Into<String>,
        slot_name: impl Into<String>,
    ) -> Self {
        Patch::CreateNode {
            node_type: node_type.into(),
            parent: Some(PatchParent {
                node_id: parent_id.into(),
                slot_name: slot_name.into(),
                index: None,
            }),
            node_id: None,
        }
    }

    pub fn delete(node_id: impl Into<String>) -> Self {
        Patch::DeleteNode {
            node_id: node_id.into(),
        }
    }

    pub fn rename(node_id: impl Into<String>, new_id: impl Into<String>) -> Self {
        Patch::RenameNode {
            node_id: node_id.into(),
            new_id: new_id.into(),
        }
    }

    pub fn set_input(
        node_id: impl Into<String>,
        input_name: impl Into<String>,
        index: Option<u32>,
        expression: Option<ExpressionJson>,
    ) -> Self {
        Patch::SetNodeInput {
            node_id: node_id.into(),
            input_name: input_name.into(),
            index,
            expression,
        }
    }

    /// Short variant name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Patch::CreateNode { .. } => "create-node",
            Patch::DeleteNode { .. } => "delete-node",
            Patch::RenameNode { .. } => "rename-node",
            Patch::SetNodeInput { .. } => "set-node-input",
        }
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Patch::CreateNode {
                node_type,
                parent,
                node_id,
            } => {
                write!(f, "create {}", node_type)?;
                if let Some(node_id) = node_id {
                    write!(f, " '{}'", node_id)?;
                }
                match parent {
                    Some(PatchParent {
                        node_id,
                        slot_name,
                        index: Some(index),
                    }) => write!(f, " in {}.{}[{}]", node_id, slot_name, index),
                    Some(parent) => write!(f, " in {}.{}", parent.node_id, parent.slot_name),
                    None => f.write_str(" as root"),
                }
            }
            Patch::DeleteNode { node_id } => write!(f, "delete '{}'", node_id),
            Patch::RenameNode { node_id, new_id } => {
                write!(f, "rename '{}' to '{}'", node_id, new_id)
            }
            Patch::SetNodeInput {
                node_id,
                input_name,
                index,
                expression,
            } => {
                write!(f, "set {}.{}", node_id, input_name)?;
                if let Some(index) = index {
                    write!(f, "[{}]", index)?;
                }
                if expression.is_none() {
                    f.write_str(" (clear)")?;
                }
                Ok(())
            }
        }
    }
}
