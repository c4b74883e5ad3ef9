//! # Nodes
//!
//! One vertex of the document tree.
//!
//! `NodeData` is immutable once shared: every operation returns an updated
//! copy and, where other nodes are affected, a [`MovedChildren`] map telling
//! the document which children need their `parent` rewritten. The document
//! stores nodes behind `Arc`, so an edit only copies the nodes it touches.
//!
//! Input bindings are keyed by `inputName` for plain inputs and by
//! `inputName::index` for inputs of a collection slot (one binding per child).

use crate::error::NodeError;
use indexmap::IndexMap;
use initiative_expression::Expression;
use initiative_schema::{NodeSchema, SchemaError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Link from a node to the slot holding it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeParent {
    pub node_id: String,
    pub slot_name: String,

    /// Position within a collection slot; `None` for single slots
    pub index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotChildren {
    Single(Option<String>),
    Collection(Vec<String>),
}

impl SlotChildren {
    pub fn len(&self) -> usize {
        match self {
            SlotChildren::Single(child) => usize::from(child.is_some()),
            SlotChildren::Collection(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Children with their collection index
    pub fn children(&self) -> Vec<(Option<u32>, &str)> {
        match self {
            SlotChildren::Single(child) => child.iter().map(|id| (None, id.as_str())).collect(),
            SlotChildren::Collection(children) => children
                .iter()
                .enumerate()
                .map(|(i, id)| (Some(i as u32), id.as_str()))
                .collect(),
        }
    }
}

/// Children whose `parent` changed as a side effect of an operation
pub type MovedChildren = BTreeMap<String, NodeParent>;

/// Key under which an input binding is stored
pub fn input_key(input_name: &str, index: Option<u32>) -> String {
    match index {
        Some(index) => format!("{}::{}", input_name, index),
        None => input_name.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct NodeData {
    schema: Arc<NodeSchema>,
    id: String,
    parent: Option<NodeParent>,
    slots: IndexMap<String, SlotChildren>,
    inputs: BTreeMap<String, Expression>,
}

impl PartialEq for NodeData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.schema.name() == other.schema.name()
            && self.parent == other.parent
            && self.slots == other.slots
            && self.inputs == other.inputs
    }
}

impl NodeData {
    /// A node with empty slots and no bound inputs
    pub fn empty(schema: Arc<NodeSchema>, id: impl Into<String>, parent: Option<NodeParent>) -> Self {
        let slots = schema
            .slots()
            .iter()
            .map(|(name, slot)| {
                let children = if slot.is_collection() {
                    SlotChildren::Collection(Vec::new())
                } else {
                    SlotChildren::Single(None)
                };
                (name.clone(), children)
            })
            .collect();

        Self {
            schema,
            id: id.into(),
            parent,
            slots,
            inputs: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node_type(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Arc<NodeSchema> {
        &self.schema
    }

    pub fn parent(&self) -> Option<&NodeParent> {
        self.parent.as_ref()
    }

    pub fn slots(&self) -> &IndexMap<String, SlotChildren> {
        &self.slots
    }

    pub fn slot(&self, slot_name: &str) -> Result<&SlotChildren, NodeError> {
        self.slots
            .get(slot_name)
            .ok_or_else(|| unknown_slot(&self.schema, slot_name))
    }

    pub fn input(&self, input_name: &str, index: Option<u32>) -> Option<&Expression> {
        self.inputs.get(&input_key(input_name, index))
    }

    /// Ids of all direct children, in slot declaration and index order
    pub fn child_ids(&self) -> Vec<String> {
        self.for_each_slot(|child_id, _, _| child_id.to_string())
    }

    /// Attach `child_id` to `slot_name`
    ///
    /// Single slots must be empty. Collection slots insert at `index` (or
    /// append), shifting later children and their collection inputs up by
    /// one. Returns the updated node, the new child's parent link and the
    /// shifted siblings.
    pub fn add_child(
        &self,
        child_id: &str,
        slot_name: &str,
        index: Option<u32>,
    ) -> Result<(NodeData, NodeParent, MovedChildren), NodeError> {
        let mut updated = self.clone();
        let mut moved = MovedChildren::new();

        let position = match updated.slot_mut(slot_name)? {
            SlotChildren::Single(child) => {
                if index.is_some() {
                    return Err(NodeError::NotACollectionSlot {
                        node_id: self.id.clone(),
                        slot_name: slot_name.to_string(),
                    });
                }
                if child.is_some() {
                    return Err(NodeError::SlotOccupied {
                        node_id: self.id.clone(),
                        slot_name: slot_name.to_string(),
                    });
                }
                *child = Some(child_id.to_string());
                None
            }
            SlotChildren::Collection(children) => {
                let len = children.len() as u32;
                let position = index.unwrap_or(len);
                if position > len {
                    return Err(NodeError::IndexOutOfBounds {
                        node_id: self.id.clone(),
                        slot_name: slot_name.to_string(),
                        index: position,
                    });
                }
                children.insert(position as usize, child_id.to_string());
                for (i, sibling) in children.iter().enumerate().skip(position as usize + 1) {
                    moved.insert(
                        sibling.clone(),
                        NodeParent {
                            node_id: self.id.clone(),
                            slot_name: slot_name.to_string(),
                            index: Some(i as u32),
                        },
                    );
                }
                updated.shift_collection_inputs_up(slot_name, position, len);
                Some(position)
            }
        };

        let parent = NodeParent {
            node_id: self.id.clone(),
            slot_name: slot_name.to_string(),
            index: position,
        };
        Ok((updated, parent, moved))
    }

    /// Detach the child in `slot_name` (at `index` for collection slots)
    ///
    /// Later collection children shift down by one; the collection inputs
    /// bound for the removed child are dropped and later ones follow their
    /// child.
    pub fn remove_child(
        &self,
        slot_name: &str,
        index: Option<u32>,
    ) -> Result<(NodeData, MovedChildren), NodeError> {
        let mut updated = self.clone();
        let mut moved = MovedChildren::new();

        match updated.slot_mut(slot_name)? {
            SlotChildren::Single(child) => {
                if index.is_some() {
                    return Err(NodeError::NotACollectionSlot {
                        node_id: self.id.clone(),
                        slot_name: slot_name.to_string(),
                    });
                }
                *child = None;
            }
            SlotChildren::Collection(children) => {
                let Some(position) = index else {
                    return Err(NodeError::MissingIndex {
                        node_id: self.id.clone(),
                        slot_name: slot_name.to_string(),
                    });
                };
                let len = children.len() as u32;
                if position >= len {
                    return Err(NodeError::IndexOutOfBounds {
                        node_id: self.id.clone(),
                        slot_name: slot_name.to_string(),
                        index: position,
                    });
                }
                children.remove(position as usize);
                for (i, sibling) in children.iter().enumerate().skip(position as usize) {
                    moved.insert(
                        sibling.clone(),
                        NodeParent {
                            node_id: self.id.clone(),
                            slot_name: slot_name.to_string(),
                            index: Some(i as u32),
                        },
                    );
                }
                updated.shift_collection_inputs_down(slot_name, position, len);
            }
        }

        Ok((updated, moved))
    }

    /// Rewrite this node's own parent link
    pub fn move_to(&self, parent: NodeParent) -> NodeData {
        let mut updated = self.clone();
        updated.parent = Some(parent);
        updated
    }

    /// Change the id; every direct child is reported because its parent link
    /// names the old id
    pub fn rename(&self, new_id: &str) -> (NodeData, MovedChildren) {
        let mut updated = self.clone();
        updated.id = new_id.to_string();

        let moved = self
            .for_each_slot(|child_id, slot_name, index| {
                (
                    child_id.to_string(),
                    NodeParent {
                        node_id: new_id.to_string(),
                        slot_name: slot_name.to_string(),
                        index,
                    },
                )
            })
            .into_iter()
            .collect();

        (updated, moved)
    }

    /// Replace the child id stored at `slot_name` (and `index`)
    pub fn rename_child(
        &self,
        new_child_id: &str,
        slot_name: &str,
        index: Option<u32>,
    ) -> Result<NodeData, NodeError> {
        let mut updated = self.clone();

        match (updated.slot_mut(slot_name)?, index) {
            (SlotChildren::Single(child), None) => {
                *child = Some(new_child_id.to_string());
            }
            (SlotChildren::Single(_), Some(_)) => {
                return Err(NodeError::NotACollectionSlot {
                    node_id: self.id.clone(),
                    slot_name: slot_name.to_string(),
                });
            }
            (SlotChildren::Collection(children), Some(index)) => {
                let entry = children.get_mut(index as usize).ok_or_else(|| {
                    NodeError::IndexOutOfBounds {
                        node_id: self.id.clone(),
                        slot_name: slot_name.to_string(),
                        index,
                    }
                })?;
                *entry = new_child_id.to_string();
            }
            (SlotChildren::Collection(_), None) => {
                return Err(NodeError::MissingIndex {
                    node_id: self.id.clone(),
                    slot_name: slot_name.to_string(),
                });
            }
        }

        Ok(updated)
    }

    /// Bind `expression` to an input, or clear it with `None`
    ///
    /// Collection inputs need the index of an existing child; plain inputs
    /// must not have one.
    pub fn set_input(
        &self,
        expression: Option<Expression>,
        input_name: &str,
        index: Option<u32>,
    ) -> Result<NodeData, NodeError> {
        let valid_index = match (self.schema.collection_slot_of(input_name)?, index) {
            (None, None) => true,
            (Some(slot_name), Some(index)) => (index as usize) < self.slot(slot_name)?.len(),
            _ => false,
        };
        if !valid_index {
            return Err(NodeError::InvalidInputIndex {
                node_id: self.id.clone(),
                input_name: input_name.to_string(),
            });
        }

        let mut updated = self.clone();
        let key = input_key(input_name, index);
        match expression {
            Some(expression) => {
                updated.inputs.insert(key, expression);
            }
            None => {
                updated.inputs.remove(&key);
            }
        }
        Ok(updated)
    }

    /// Visit every child as `(child_id, slot_name, index)`
    ///
    /// Slots are visited in declaration order, collection children in index
    /// order.
    pub fn for_each_slot<R>(&self, mut visitor: impl FnMut(&str, &str, Option<u32>) -> R) -> Vec<R> {
        let mut results = Vec::new();
        for (slot_name, children) in &self.slots {
            for (index, child_id) in children.children() {
                results.push(visitor(child_id, slot_name, index));
            }
        }
        results
    }

    /// Visit every declared input as `(expression, input_name, index)`
    ///
    /// Plain inputs come first in declaration order, then the inputs of each
    /// collection slot, child by child. Unbound inputs are visited with
    /// `None`.
    pub fn for_each_input<R>(
        &self,
        mut visitor: impl FnMut(Option<&Expression>, &str, Option<u32>) -> R,
    ) -> Vec<R> {
        let mut results = Vec::new();
        for input_name in self.schema.inputs().keys() {
            results.push(visitor(self.input(input_name, None), input_name, None));
        }
        for (slot_name, children) in &self.slots {
            for index in 0..children.len() as u32 {
                for (input_name, _) in self.schema.collection_inputs(slot_name) {
                    let expression = self.input(input_name, Some(index));
                    results.push(visitor(expression, input_name, Some(index)));
                }
            }
        }
        results
    }

    /// Bound inputs only, in [`NodeData::for_each_input`] order
    pub fn bound_inputs(&self) -> Vec<(String, Option<u32>, Expression)> {
        self.for_each_input(|expression, input_name, index| {
            expression.map(|expression| (input_name.to_string(), index, expression.clone()))
        })
        .into_iter()
        .flatten()
        .collect()
    }

    fn slot_mut(&mut self, slot_name: &str) -> Result<&mut SlotChildren, NodeError> {
        let schema = &self.schema;
        self.slots
            .get_mut(slot_name)
            .ok_or_else(|| unknown_slot(schema, slot_name))
    }

    /// Make room at `position` in a collection of `len` children
    fn shift_collection_inputs_up(&mut self, slot_name: &str, position: u32, len: u32) {
        let schema = Arc::clone(&self.schema);
        for (input_name, _) in schema.collection_inputs(slot_name) {
            for i in (position..len).rev() {
                if let Some(expression) = self.inputs.remove(&input_key(input_name, Some(i))) {
                    self.inputs
                        .insert(input_key(input_name, Some(i + 1)), expression);
                }
            }
        }
    }

    /// Drop the bindings at `position` in a collection of `len` children
    fn shift_collection_inputs_down(&mut self, slot_name: &str, position: u32, len: u32) {
        let schema = Arc::clone(&self.schema);
        for (input_name, _) in schema.collection_inputs(slot_name) {
            self.inputs.remove(&input_key(input_name, Some(position)));
            for i in position + 1..len {
                if let Some(expression) = self.inputs.remove(&input_key(input_name, Some(i))) {
                    self.inputs
                        .insert(input_key(input_name, Some(i - 1)), expression);
                }
            }
        }
    }
}

fn unknown_slot(schema: &NodeSchema, slot_name: &str) -> NodeError {
    SchemaError::UnknownSlot {
        node_type: schema.name().to_string(),
        slot_name: slot_name.to_string(),
    }
    .into()
}
