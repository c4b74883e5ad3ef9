//! # Node Schemas
//!
//! A [`NodeSchema`] declares what a node of one type looks like: its inputs,
//! the outputs it exposes to descendants, and its slots.
//!
//! ## Slots
//!
//! A slot that declares an `inputs` table (even an empty one) is a
//! **collection slot**: it holds 0..N ordered children, and each of its
//! inputs is bound once per child under the key `"inputName::index"`.
//! Every other slot is a **single slot** holding 0 or 1 child.
//!
//! ## Outputs
//!
//! An output with a `slot` is only visible to descendants attached through
//! that slot.

use crate::error::SchemaError;
use crate::types::ValueType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputAttributes {
    #[serde(rename = "type")]
    pub ty: ValueType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl InputAttributes {
    pub fn new(ty: ValueType) -> Self {
        Self { ty, doc: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputAttributes {
    #[serde(rename = "type")]
    pub ty: ValueType,

    /// Restricts visibility to descendants attached through this slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl OutputAttributes {
    pub fn new(ty: ValueType) -> Self {
        Self {
            ty,
            slot: None,
            doc: None,
        }
    }

    pub fn scoped_to(ty: ValueType, slot: impl Into<String>) -> Self {
        Self {
            ty,
            slot: Some(slot.into()),
            doc: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<IndexMap<String, InputAttributes>>,
}

impl SlotSchema {
    pub fn single() -> Self {
        Self { inputs: None }
    }

    pub fn collection(inputs: IndexMap<String, InputAttributes>) -> Self {
        Self {
            inputs: Some(inputs),
        }
    }

    pub fn is_collection(&self) -> bool {
        self.inputs.is_some()
    }
}

/// Declaration of one node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeSchemaJson", into = "NodeSchemaJson")]
pub struct NodeSchema {
    name: String,
    inputs: IndexMap<String, InputAttributes>,
    outputs: IndexMap<String, OutputAttributes>,
    slots: IndexMap<String, SlotSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeSchemaJson {
    name: String,
    #[serde(default)]
    inputs: IndexMap<String, InputAttributes>,
    #[serde(default)]
    outputs: IndexMap<String, OutputAttributes>,
    #[serde(default)]
    slots: IndexMap<String, SlotSchema>,
}

impl TryFrom<NodeSchemaJson> for NodeSchema {
    type Error = SchemaError;

    fn try_from(json: NodeSchemaJson) -> Result<Self, Self::Error> {
        NodeSchema::new(json.name, json.inputs, json.outputs, json.slots)
    }
}

impl From<NodeSchema> for NodeSchemaJson {
    fn from(schema: NodeSchema) -> Self {
        NodeSchemaJson {
            name: schema.name,
            inputs: schema.inputs,
            outputs: schema.outputs,
            slots: schema.slots,
        }
    }
}

impl NodeSchema {
    /// Create a schema, rejecting duplicate input names and outputs scoped
    /// to slots that don't exist
    pub fn new(
        name: impl Into<String>,
        inputs: IndexMap<String, InputAttributes>,
        outputs: IndexMap<String, OutputAttributes>,
        slots: IndexMap<String, SlotSchema>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::InvalidName { name });
        }

        let mut all_inputs = HashSet::new();
        let collection_inputs = slots
            .values()
            .filter_map(|slot| slot.inputs.as_ref())
            .flat_map(|inputs| inputs.keys());
        for input_name in inputs.keys().chain(collection_inputs) {
            if !is_identifier(input_name) {
                return Err(SchemaError::InvalidName {
                    name: input_name.clone(),
                });
            }
            if !all_inputs.insert(input_name.as_str()) {
                return Err(SchemaError::DuplicateInput {
                    node_type: name,
                    input_name: input_name.clone(),
                });
            }
        }

        for slot_name in slots.keys() {
            if !is_identifier(slot_name) {
                return Err(SchemaError::InvalidName {
                    name: slot_name.clone(),
                });
            }
        }

        for output in outputs.values() {
            if let Some(slot_name) = &output.slot {
                if !slots.contains_key(slot_name) {
                    return Err(SchemaError::UnknownSlot {
                        node_type: name,
                        slot_name: slot_name.clone(),
                    });
                }
            }
        }

        Ok(Self {
            name,
            inputs,
            outputs,
            slots,
        })
    }

    pub fn builder(name: impl Into<String>) -> NodeSchemaBuilder {
        NodeSchemaBuilder {
            name: name.into(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            slots: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The part of the name after the last `::`, used to generate node ids
    ///
    /// Nested names keep only the final segment: `@demo/ui::forms::Input`
    /// gives `Input`, not `forms`.
    pub fn type_prefix(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    pub fn inputs(&self) -> &IndexMap<String, InputAttributes> {
        &self.inputs
    }

    pub fn outputs(&self) -> &IndexMap<String, OutputAttributes> {
        &self.outputs
    }

    pub fn slots(&self) -> &IndexMap<String, SlotSchema> {
        &self.slots
    }

    /// Attributes of a plain or collection input
    pub fn input_attributes(&self, input_name: &str) -> Result<&InputAttributes, SchemaError> {
        if let Some(attributes) = self.inputs.get(input_name) {
            return Ok(attributes);
        }
        self.slots
            .values()
            .filter_map(|slot| slot.inputs.as_ref())
            .find_map(|inputs| inputs.get(input_name))
            .ok_or_else(|| SchemaError::UnknownInput {
                node_type: self.name.clone(),
                input_name: input_name.to_string(),
            })
    }

    pub fn output_attributes(&self, output_name: &str) -> Result<&OutputAttributes, SchemaError> {
        self.outputs
            .get(output_name)
            .ok_or_else(|| SchemaError::UnknownOutput {
                node_type: self.name.clone(),
                output_name: output_name.to_string(),
            })
    }

    pub fn slot(&self, slot_name: &str) -> Result<&SlotSchema, SchemaError> {
        self.slots
            .get(slot_name)
            .ok_or_else(|| SchemaError::UnknownSlot {
                node_type: self.name.clone(),
                slot_name: slot_name.to_string(),
            })
    }

    pub fn is_collection_slot(&self, slot_name: &str) -> Result<bool, SchemaError> {
        Ok(self.slot(slot_name)?.is_collection())
    }

    /// Name of the collection slot that declares `input_name`, or `None` for
    /// plain inputs
    pub fn collection_slot_of(&self, input_name: &str) -> Result<Option<&str>, SchemaError> {
        if self.inputs.contains_key(input_name) {
            return Ok(None);
        }
        self.slots
            .iter()
            .find(|(_, slot)| {
                slot.inputs
                    .as_ref()
                    .is_some_and(|inputs| inputs.contains_key(input_name))
            })
            .map(|(slot_name, _)| Some(slot_name.as_str()))
            .ok_or_else(|| SchemaError::UnknownInput {
                node_type: self.name.clone(),
                input_name: input_name.to_string(),
            })
    }

    /// Inputs bound once per child of the collection slot `slot_name`
    pub fn collection_inputs(
        &self,
        slot_name: &str,
    ) -> impl Iterator<Item = (&String, &InputAttributes)> {
        self.slots
            .get(slot_name)
            .and_then(|slot| slot.inputs.as_ref())
            .into_iter()
            .flat_map(|inputs| inputs.iter())
    }
}

/// Incremental construction of a [`NodeSchema`]
#[derive(Debug, Clone)]
pub struct NodeSchemaBuilder {
    name: String,
    inputs: IndexMap<String, InputAttributes>,
    outputs: IndexMap<String, OutputAttributes>,
    slots: IndexMap<String, SlotSchema>,
}

impl NodeSchemaBuilder {
    pub fn input(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.inputs.insert(name.into(), InputAttributes::new(ty));
        self
    }

    pub fn output(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.outputs.insert(name.into(), OutputAttributes::new(ty));
        self
    }

    pub fn slot_output(
        mut self,
        name: impl Into<String>,
        ty: ValueType,
        slot: impl Into<String>,
    ) -> Self {
        self.outputs
            .insert(name.into(), OutputAttributes::scoped_to(ty, slot));
        self
    }

    pub fn slot(mut self, name: impl Into<String>) -> Self {
        self.slots.insert(name.into(), SlotSchema::single());
        self
    }

    pub fn collection_slot<K: Into<String>>(
        mut self,
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = (K, ValueType)>,
    ) -> Self {
        let inputs = inputs
            .into_iter()
            .map(|(input_name, ty)| (input_name.into(), InputAttributes::new(ty)))
            .collect();
        self.slots.insert(name.into(), SlotSchema::collection(inputs));
        self
    }

    pub fn build(self) -> Result<NodeSchema, SchemaError> {
        NodeSchema::new(self.name, self.inputs, self.outputs, self.slots)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_schema() -> NodeSchema {
        NodeSchema::builder("@demo/mui::Stack")
            .input("gap", ValueType::Number)
            .collection_slot("child", [("alignSelf", ValueType::String)])
            .slot("footer")
            .slot_output("index", ValueType::Number, "child")
            .build()
            .unwrap()
    }

    #[test]
    fn test_collection_slots_are_detected() {
        let schema = stack_schema();
        assert!(schema.is_collection_slot("child").unwrap());
        assert!(!schema.is_collection_slot("footer").unwrap());
        assert!(matches!(
            schema.is_collection_slot("missing"),
            Err(SchemaError::UnknownSlot { .. })
        ));
    }

    #[test]
    fn test_input_lookup_covers_collection_inputs() {
        let schema = stack_schema();
        assert_eq!(schema.input_attributes("gap").unwrap().ty, ValueType::Number);
        assert_eq!(
            schema.input_attributes("alignSelf").unwrap().ty,
            ValueType::String
        );
        assert_eq!(schema.collection_slot_of("gap").unwrap(), None);
        assert_eq!(schema.collection_slot_of("alignSelf").unwrap(), Some("child"));
        assert!(schema.input_attributes("nope").is_err());
        assert_eq!(schema.collection_inputs("child").count(), 1);
        assert_eq!(schema.collection_inputs("footer").count(), 0);
    }

    #[test]
    fn test_duplicate_inputs_are_rejected() {
        let result = NodeSchema::builder("Dup")
            .input("value", ValueType::String)
            .collection_slot("items", [("value", ValueType::Number)])
            .build();

        assert!(matches!(result, Err(SchemaError::DuplicateInput { .. })));
    }

    #[test]
    fn test_output_scoped_to_unknown_slot_is_rejected() {
        let result = NodeSchema::builder("Bad")
            .slot_output("x", ValueType::Number, "missing")
            .build();

        assert!(matches!(result, Err(SchemaError::UnknownSlot { .. })));
    }

    #[test]
    fn test_input_keys_cannot_contain_separator() {
        let result = NodeSchema::builder("Bad")
            .input("a::0", ValueType::Number)
            .build();

        assert!(matches!(result, Err(SchemaError::InvalidName { .. })));
    }

    #[test]
    fn test_type_prefix() {
        assert_eq!(stack_schema().type_prefix(), "Stack");
        assert_eq!(NodeSchema::builder("Root").build().unwrap().type_prefix(), "Root");
        assert_eq!(
            NodeSchema::builder("@demo/ui::forms::Input")
                .build()
                .unwrap()
                .type_prefix(),
            "Input"
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "name": "Card",
            "inputs": { "title": { "type": { "kind": "string" } } },
            "slots": { "body": {}, "actions": { "inputs": {} } }
        }"#;
        let schema: NodeSchema = serde_json::from_str(json).unwrap();
        assert!(!schema.is_collection_slot("body").unwrap());
        assert!(schema.is_collection_slot("actions").unwrap());

        let dup = r#"{
            "name": "Card",
            "inputs": { "title": { "type": { "kind": "string" } } },
            "slots": { "body": { "inputs": { "title": { "type": { "kind": "string" } } } } }
        }"#;
        assert!(serde_json::from_str::<NodeSchema>(dup).is_err());
    }
}
