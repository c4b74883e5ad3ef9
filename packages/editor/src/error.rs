//! Error types for the editor

use initiative_expression::ExpressionError;
use initiative_schema::SchemaError;
use thiserror::Error;

/// Structural errors raised by [`crate::NodeData`] operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Slot '{slot_name}' of node '{node_id}' is already occupied")]
    SlotOccupied { node_id: String, slot_name: String },

    #[error("Index {index} is out of bounds for slot '{slot_name}' of node '{node_id}'")]
    IndexOutOfBounds {
        node_id: String,
        slot_name: String,
        index: u32,
    },

    #[error("Slot '{slot_name}' of node '{node_id}' is not a collection slot")]
    NotACollectionSlot { node_id: String, slot_name: String },

    #[error("Collection slot '{slot_name}' of node '{node_id}' requires an index")]
    MissingIndex { node_id: String, slot_name: String },

    #[error("Invalid index for input '{input_name}' of node '{node_id}'")]
    InvalidInputIndex { node_id: String, input_name: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Reasons a patch is rejected by [`crate::Document`]
///
/// A rejected patch leaves the document untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Node '{node_id}' not found")]
    NodeNotFound { node_id: String },

    #[error("A node with id '{node_id}' already exists")]
    IdAlreadyExists { node_id: String },

    #[error("Document is not empty")]
    DocumentNotEmpty,

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),
}
