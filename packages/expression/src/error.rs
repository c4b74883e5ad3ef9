use initiative_schema::{SchemaError, ValueType};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch {
        expected: ValueType,
        actual: ValueType,
    },

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Node '{node_id}' is not an ancestor of this node")]
    NotAnAncestor { node_id: String },

    #[error("Output '{node_id}::{output_name}' is not exposed to this node")]
    OutputNotExposed {
        node_id: String,
        output_name: String,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
