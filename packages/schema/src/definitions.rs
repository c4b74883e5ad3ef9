//! # Definitions
//!
//! Registry of everything an expression or node may refer to by name:
//! node schemas, JSON literal schemas and extension methods.
//!
//! Node schemas are shared through `Arc` so nodes can hold on to their schema
//! without borrowing the registry.

use crate::error::SchemaError;
use crate::node_schema::NodeSchema;
use crate::types::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Named JSON value type, e.g. a theme color or a route table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonLiteralSchema {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: ValueType,
}

/// Method callable on any value assignable to `self_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionMethodDefinition {
    pub name: String,
    pub self_type: ValueType,
    #[serde(default)]
    pub params: Vec<ValueType>,
    pub returns: ValueType,
}

/// On-disk form of [`Definitions`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionsJson {
    #[serde(default)]
    pub nodes: Vec<NodeSchema>,
    #[serde(default)]
    pub json_literals: Vec<JsonLiteralSchema>,
    #[serde(default)]
    pub extension_methods: Vec<ExtensionMethodDefinition>,
}

#[derive(Debug, Clone, Default)]
pub struct Definitions {
    nodes: HashMap<String, Arc<NodeSchema>>,
    json_literals: HashMap<String, JsonLiteralSchema>,
    extension_methods: HashMap<String, ExtensionMethodDefinition>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: DefinitionsJson) -> Result<Self, SchemaError> {
        let mut definitions = Self::new();
        for schema in json.nodes {
            definitions.add_node(schema)?;
        }
        for literal in json.json_literals {
            definitions.add_json_literal(literal)?;
        }
        for method in json.extension_methods {
            definitions.add_extension_method(method)?;
        }
        Ok(definitions)
    }

    pub fn from_json_str(source: &str) -> Result<Self, SchemaError> {
        Self::from_json(serde_json::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Load(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&source)
    }

    pub fn add_node(&mut self, schema: NodeSchema) -> Result<(), SchemaError> {
        if self.nodes.contains_key(schema.name()) {
            return Err(SchemaError::DuplicateDefinition {
                name: schema.name().to_string(),
            });
        }
        self.nodes.insert(schema.name().to_string(), Arc::new(schema));
        Ok(())
    }

    /// Builder-style variant of [`Definitions::add_node`]
    pub fn with_node(mut self, schema: NodeSchema) -> Result<Self, SchemaError> {
        self.add_node(schema)?;
        Ok(self)
    }

    pub fn add_json_literal(&mut self, literal: JsonLiteralSchema) -> Result<(), SchemaError> {
        if self.json_literals.contains_key(&literal.name) {
            return Err(SchemaError::DuplicateDefinition { name: literal.name });
        }
        self.json_literals.insert(literal.name.clone(), literal);
        Ok(())
    }

    pub fn add_extension_method(
        &mut self,
        method: ExtensionMethodDefinition,
    ) -> Result<(), SchemaError> {
        if self.extension_methods.contains_key(&method.name) {
            return Err(SchemaError::DuplicateDefinition { name: method.name });
        }
        self.extension_methods.insert(method.name.clone(), method);
        Ok(())
    }

    /// Look up a node schema by its full type name
    pub fn get_node(&self, node_type: &str) -> Result<&Arc<NodeSchema>, SchemaError> {
        self.nodes
            .get(node_type)
            .ok_or_else(|| SchemaError::UnknownNodeType {
                node_type: node_type.to_string(),
            })
    }

    pub fn get_json_literal(&self, name: &str) -> Result<&JsonLiteralSchema, SchemaError> {
        self.json_literals
            .get(name)
            .ok_or_else(|| SchemaError::UnknownJsonLiteral {
                name: name.to_string(),
            })
    }

    pub fn get_extension_method(
        &self,
        name: &str,
    ) -> Result<&ExtensionMethodDefinition, SchemaError> {
        self.extension_methods
            .get(name)
            .ok_or_else(|| SchemaError::UnknownExtensionMethod {
                name: name.to_string(),
            })
    }

    /// Node schemas sorted by name
    pub fn node_schemas(&self) -> Vec<&Arc<NodeSchema>> {
        let mut schemas: Vec<_> = self.nodes.values().collect();
        schemas.sort_by(|a, b| a.name().cmp(b.name()));
        schemas
    }
}
