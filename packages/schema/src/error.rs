use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown node type '{node_type}'")]
    UnknownNodeType { node_type: String },

    #[error("Input '{input_name}' doesn't exist on type '{node_type}'")]
    UnknownInput {
        node_type: String,
        input_name: String,
    },

    #[error("Output '{output_name}' doesn't exist on type '{node_type}'")]
    UnknownOutput {
        node_type: String,
        output_name: String,
    },

    #[error("Slot '{slot_name}' doesn't exist on type '{node_type}'")]
    UnknownSlot {
        node_type: String,
        slot_name: String,
    },

    #[error("Duplicate input id '{input_name}' on type '{node_type}'")]
    DuplicateInput {
        node_type: String,
        input_name: String,
    },

    #[error("Invalid identifier '{name}'")]
    InvalidName { name: String },

    #[error("Duplicate definition '{name}'")]
    DuplicateDefinition { name: String },

    #[error("Unknown JSON literal schema '{name}'")]
    UnknownJsonLiteral { name: String },

    #[error("Unknown extension method '{name}'")]
    UnknownExtensionMethod { name: String },

    #[error("Failed to load definitions: {0}")]
    Load(String),
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Load(e.to_string())
    }
}
