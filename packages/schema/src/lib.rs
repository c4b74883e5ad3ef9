//! # Initiative Schema
//!
//! Node type declarations and the value type system used to validate input
//! bindings.
//!
//! - [`ValueType`]: structural types with assignability checks
//! - [`NodeSchema`]: inputs, outputs and slots of one node type
//! - [`Definitions`]: registry of node schemas, JSON literal schemas and
//!   extension methods, loadable from JSON

pub mod definitions;
pub mod error;
pub mod node_schema;
pub mod types;

pub use definitions::{Definitions, DefinitionsJson, ExtensionMethodDefinition, JsonLiteralSchema};
pub use error::SchemaError;
pub use node_schema::{InputAttributes, NodeSchema, NodeSchemaBuilder, OutputAttributes, SlotSchema};
pub use types::ValueType;
