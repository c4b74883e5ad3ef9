//! # Document
//!
//! Owns the node tree and is the single entry point for edits.
//!
//! ## Lifecycle of a patch
//!
//! 1. Ids for `create-node` patches without one are generated
//!    (`<TypePrefix><n>`, smallest free `n`).
//! 2. Inverse patches are computed from the current state.
//! 3. The patch is applied to a copy-on-write node map. Any error restores
//!    the previous map, so a rejected patch leaves no trace.
//! 4. The inverses are pushed to the undo log as one group (unless the edit
//!    is debounced into the previous one).
//! 5. The version is bumped, change listeners receive the changed ids, then
//!    patch listeners receive the patch.
//!
//! `undo()` pops one group and applies it as a single transaction: one
//! version bump and one change notification for the whole group, followed by
//! one patch notification per applied inverse.

use crate::config::DocumentConfig;
use crate::error::DocumentError;
use crate::node::{MovedChildren, NodeData, NodeParent};
use crate::patch::{Patch, PatchParent};
use crate::undo_log::UndoLog;
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use initiative_common::{Clock, Listeners, SystemClock, Unsubscribe};
use initiative_expression::{Expression, ExpressionError, ExpressionJson, ValidateExpressionContext};
use initiative_schema::{Definitions, ExtensionMethodDefinition, JsonLiteralSchema, ValueType};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Outcome of a successful [`Document::apply_patch`] or [`Document::undo`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    /// Document version after the change
    pub version: u64,

    /// Ids of created, updated and deleted nodes, without duplicates
    pub changed_ids: Vec<String>,
}

/// Receives document notifications; see [`Document::observe`]
pub trait DocumentObserver: Send + Sync {
    fn on_change(&self, _changed_ids: &[String]) {}

    fn on_patch(&self, _patch: &Patch) {}
}

type ChangedIds = IndexSet<String>;

struct Snapshot {
    root_id: Option<String>,
    nodes: HashMap<String, Arc<NodeData>>,
}

pub struct Document {
    name: String,
    definitions: Arc<Definitions>,
    clock: Arc<dyn Clock>,
    root_id: Option<String>,
    nodes: HashMap<String, Arc<NodeData>>,
    version: u64,
    undo_log: UndoLog,
    change_listeners: Listeners<[String]>,
    patch_listeners: Listeners<Patch>,
}

impl Document {
    /// Create an empty document
    pub fn new(name: impl Into<String>, definitions: Arc<Definitions>) -> Self {
        Self::with_config(name, definitions, DocumentConfig::default())
    }

    pub fn with_config(
        name: impl Into<String>,
        definitions: Arc<Definitions>,
        config: DocumentConfig,
    ) -> Self {
        Self {
            name: name.into(),
            definitions,
            clock: Arc::new(SystemClock),
            root_id: None,
            nodes: HashMap::new(),
            version: 0,
            undo_log: UndoLog::new(config.undo),
            change_listeners: Listeners::new(),
            patch_listeners: Listeners::new(),
        }
    }

    /// Replace the clock used to timestamp undo entries
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definitions(&self) -> &Arc<Definitions> {
        &self.definitions
    }

    pub fn root_id(&self) -> Option<&str> {
        self.root_id.as_deref()
    }

    /// Incremented once per applied patch or undo
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn get_node(&self, node_id: &str) -> Result<&NodeData, DocumentError> {
        self.nodes
            .get(node_id)
            .map(Arc::as_ref)
            .ok_or_else(|| DocumentError::NodeNotFound {
                node_id: node_id.to_string(),
            })
    }

    /// Parent links from the root down to `node_id`, one per hop
    ///
    /// Each link names the ancestor and the slot (and collection index) the
    /// path goes through, which decides the slot-scoped outputs visible to
    /// `node_id`. Empty for the root.
    pub fn get_ancestors(&self, node_id: &str) -> Result<Vec<NodeParent>, DocumentError> {
        let mut ancestors = Vec::new();
        let mut current = self.get_node(node_id)?;
        while let Some(parent) = current.parent() {
            ancestors.push(parent.clone());
            current = self.get_node(&parent.node_id)?;
        }
        ancestors.reverse();
        Ok(ancestors)
    }

    /// All node ids, breadth-first from the root
    pub fn keys(&self) -> Vec<String> {
        match &self.root_id {
            Some(root_id) => self.breadth_first(root_id),
            None => Vec::new(),
        }
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo_log
    }

    /// First inverse patch the next [`Document::undo`] would apply
    pub fn peek_undo(&self) -> Option<&Patch> {
        self.undo_log.peek().map(|entry| &entry.patch)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_log.is_empty()
    }

    /// Called with the changed ids after every applied patch or undo
    pub fn listen_changes(
        &self,
        listener: impl Fn(&[String]) + Send + Sync + 'static,
    ) -> Unsubscribe {
        self.change_listeners.add(listener)
    }

    /// Called with every applied patch, after the change listeners
    pub fn listen_patches(&self, listener: impl Fn(&Patch) + Send + Sync + 'static) -> Unsubscribe {
        self.patch_listeners.add(listener)
    }

    pub fn observe(&self, observer: Arc<dyn DocumentObserver>) -> Unsubscribe {
        let on_change = Arc::clone(&observer);
        Unsubscribe::all(vec![
            self.change_listeners
                .add(move |changed_ids: &[String]| on_change.on_change(changed_ids)),
            self.patch_listeners
                .add(move |patch: &Patch| observer.on_patch(patch)),
        ])
    }

    /// Apply `patch` and record its inverse for undo
    ///
    /// Either the whole patch applies or the document, its version and its
    /// undo log are left unchanged.
    pub fn apply_patch(&mut self, patch: Patch) -> Result<PatchResult, DocumentError> {
        let timestamp = self.clock.now();
        let snapshot = self.snapshot();

        match self.apply_logged(patch, timestamp) {
            Ok((patch, changed)) => Ok(self.commit(changed, &[patch])),
            Err(error) => {
                self.restore(snapshot);
                warn!(document = %self.name, %error, "Rejected patch");
                Err(error)
            }
        }
    }

    /// Revert the most recent undo group
    ///
    /// Returns `Ok(None)` when there is nothing to undo. Undoing does not
    /// push new undo entries.
    pub fn undo(&mut self) -> Result<Option<PatchResult>, DocumentError> {
        let Some(group) = self.undo_log.pop_group() else {
            return Ok(None);
        };

        let snapshot = self.snapshot();
        let mut changed = ChangedIds::new();
        let result = group
            .iter()
            .try_for_each(|entry| self.apply_step(&entry.patch, &mut changed));

        if let Err(error) = result {
            self.restore(snapshot);
            self.undo_log.restore(group);
            warn!(document = %self.name, %error, "Undo failed");
            return Err(error);
        }

        debug!(document = %self.name, steps = group.len(), "Undo group applied");
        let patches: Vec<Patch> = group.into_iter().map(|entry| entry.patch).collect();
        Ok(Some(self.commit(changed, &patches)))
    }

    fn apply_logged(
        &mut self,
        patch: Patch,
        timestamp: DateTime<Utc>,
    ) -> Result<(Patch, ChangedIds), DocumentError> {
        let patch = self.assign_node_id(patch)?;
        let inverses = self.inverse_of(&patch)?;

        let mut changed = ChangedIds::new();
        self.apply_step(&patch, &mut changed)?;
        self.log_inverses(&patch, inverses, timestamp);
        Ok((patch, changed))
    }

    fn commit(&mut self, changed: ChangedIds, patches: &[Patch]) -> PatchResult {
        self.version += 1;
        let changed_ids: Vec<String> = changed.into_iter().collect();

        for patch in patches {
            debug!(
                document = %self.name,
                version = self.version,
                kind = patch.kind(),
                %patch,
                "Applied patch"
            );
        }

        self.change_listeners.notify(changed_ids.as_slice());
        for patch in patches {
            self.patch_listeners.notify(patch);
        }

        PatchResult {
            version: self.version,
            changed_ids,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            root_id: self.root_id.clone(),
            nodes: self.nodes.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.root_id = snapshot.root_id;
        self.nodes = snapshot.nodes;
    }

    fn log_inverses(&mut self, patch: &Patch, inverses: Vec<Patch>, timestamp: DateTime<Utc>) {
        if let Patch::SetNodeInput {
            node_id,
            input_name,
            index,
            ..
        } = patch
        {
            if self
                .undo_log
                .should_debounce(node_id, input_name, *index, timestamp)
            {
                trace!(%node_id, %input_name, ?index, "Debounced input edit");
                return;
            }
        }
        self.undo_log.push_group(timestamp, inverses);
    }

    /// Fill in the id of a `create-node` patch that has none
    fn assign_node_id(&self, patch: Patch) -> Result<Patch, DocumentError> {
        match patch {
            Patch::CreateNode {
                node_type,
                parent,
                node_id: None,
            } => {
                let schema = self.definitions.get_node(&node_type)?;
                let node_id = self.generate_node_id(schema.type_prefix());
                Ok(Patch::CreateNode {
                    node_type,
                    parent,
                    node_id: Some(node_id),
                })
            }
            patch => Ok(patch),
        }
    }

    fn generate_node_id(&self, prefix: &str) -> String {
        let mut n: u64 = 1;
        loop {
            let node_id = format!("{}{}", prefix, n);
            if !self.nodes.contains_key(&node_id) {
                return node_id;
            }
            n += 1;
        }
    }

    /// Patches that revert `patch`, in apply order, computed before it runs
    fn inverse_of(&self, patch: &Patch) -> Result<Vec<Patch>, DocumentError> {
        match patch {
            Patch::CreateNode { node_id, .. } => Ok(node_id.iter().map(Patch::delete).collect()),
            Patch::DeleteNode { node_id } => self.recreate_patches(node_id),
            Patch::RenameNode { node_id, new_id } => Ok(vec![Patch::rename(new_id, node_id)]),
            Patch::SetNodeInput {
                node_id,
                input_name,
                index,
                ..
            } => {
                let node = self.get_node(node_id)?;
                let previous = match node.input(input_name, *index) {
                    Some(previous) => Some(previous.to_json()),
                    None if self.undo_log.config().record_first_binding => None,
                    None => return Ok(Vec::new()),
                };
                Ok(vec![Patch::set_input(node_id, input_name, *index, previous)])
            }
        }
    }

    /// Patches rebuilding the subtree at `node_id`: every node pre-order,
    /// then every bound input, then the parent's collection inputs that
    /// belonged to it
    fn recreate_patches(&self, node_id: &str) -> Result<Vec<Patch>, DocumentError> {
        let node = self.get_node(node_id)?;
        let mut patches = Vec::new();
        let mut bindings = Vec::new();
        self.collect_subtree(node, &mut patches, &mut bindings)?;
        patches.append(&mut bindings);

        if let Some(parent) = node.parent() {
            if let Some(index) = parent.index {
                let parent_node = self.get_node(&parent.node_id)?;
                for (input_name, _) in parent_node.schema().collection_inputs(&parent.slot_name) {
                    if let Some(expression) = parent_node.input(input_name, Some(index)) {
                        patches.push(Patch::set_input(
                            &parent.node_id,
                            input_name,
                            Some(index),
                            Some(expression.to_json()),
                        ));
                    }
                }
            }
        }

        Ok(patches)
    }

    fn collect_subtree(
        &self,
        node: &NodeData,
        creates: &mut Vec<Patch>,
        bindings: &mut Vec<Patch>,
    ) -> Result<(), DocumentError> {
        creates.push(Patch::CreateNode {
            node_type: node.node_type().to_string(),
            parent: node.parent().map(|parent| PatchParent {
                node_id: parent.node_id.clone(),
                slot_name: parent.slot_name.clone(),
                index: parent.index,
            }),
            node_id: Some(node.id().to_string()),
        });

        for (input_name, index, expression) in node.bound_inputs() {
            bindings.push(Patch::set_input(
                node.id(),
                input_name,
                index,
                Some(expression.to_json()),
            ));
        }

        for child_id in node.child_ids() {
            self.collect_subtree(self.get_node(&child_id)?, creates, bindings)?;
        }
        Ok(())
    }

    fn apply_step(&mut self, patch: &Patch, changed: &mut ChangedIds) -> Result<(), DocumentError> {
        match patch {
            Patch::CreateNode {
                node_type,
                parent,
                node_id,
            } => {
                let node_id = match node_id {
                    Some(node_id) => node_id.clone(),
                    None => self.generate_node_id(self.definitions.get_node(node_type)?.type_prefix()),
                };
                self.create_node(node_type, parent.as_ref(), node_id, changed)
            }
            Patch::DeleteNode { node_id } => self.delete_node(node_id, changed),
            Patch::RenameNode { node_id, new_id } => self.rename_node(node_id, new_id, changed),
            Patch::SetNodeInput {
                node_id,
                input_name,
                index,
                expression,
            } => self.set_node_input(node_id, input_name, *index, expression.as_ref(), changed),
        }
    }

    fn create_node(
        &mut self,
        node_type: &str,
        parent: Option<&PatchParent>,
        node_id: String,
        changed: &mut ChangedIds,
    ) -> Result<(), DocumentError> {
        let schema = Arc::clone(self.definitions.get_node(node_type)?);
        if self.nodes.contains_key(&node_id) {
            return Err(DocumentError::IdAlreadyExists { node_id });
        }

        let Some(parent) = parent else {
            if self.root_id.is_some() {
                return Err(DocumentError::DocumentNotEmpty);
            }
            let root = NodeData::empty(schema, node_id.clone(), None);
            self.nodes.insert(node_id.clone(), Arc::new(root));
            self.root_id = Some(node_id.clone());
            changed.insert(node_id);
            return Ok(());
        };

        let parent_node = self.shared_node(&parent.node_id)?;
        let (updated, link, moved) =
            parent_node.add_child(&node_id, &parent.slot_name, parent.index)?;
        let child = NodeData::empty(schema, node_id.clone(), Some(link));

        self.nodes.insert(parent.node_id.clone(), Arc::new(updated));
        self.nodes.insert(node_id.clone(), Arc::new(child));
        changed.insert(parent.node_id.clone());
        changed.insert(node_id);
        self.apply_moved(moved, changed)
    }

    fn delete_node(&mut self, node_id: &str, changed: &mut ChangedIds) -> Result<(), DocumentError> {
        let node = self.shared_node(node_id)?;

        let Some(parent) = node.parent() else {
            changed.extend(self.keys());
            self.nodes.clear();
            self.root_id = None;
            return Ok(());
        };

        let parent_node = self.shared_node(&parent.node_id)?;
        let (updated, moved) = parent_node.remove_child(&parent.slot_name, parent.index)?;
        self.nodes.insert(parent.node_id.clone(), Arc::new(updated));
        changed.insert(parent.node_id.clone());
        self.apply_moved(moved, changed)?;

        for removed in self.breadth_first(node_id) {
            self.nodes.remove(&removed);
            changed.insert(removed);
        }
        Ok(())
    }

    fn rename_node(
        &mut self,
        node_id: &str,
        new_id: &str,
        changed: &mut ChangedIds,
    ) -> Result<(), DocumentError> {
        let node = self.shared_node(node_id)?;
        if self.nodes.contains_key(new_id) {
            return Err(DocumentError::IdAlreadyExists {
                node_id: new_id.to_string(),
            });
        }

        let (renamed, moved) = node.rename(new_id);
        self.nodes.remove(node_id);
        self.nodes.insert(new_id.to_string(), Arc::new(renamed));
        changed.insert(node_id.to_string());
        changed.insert(new_id.to_string());

        match node.parent() {
            Some(parent) => {
                let parent_node = self.shared_node(&parent.node_id)?;
                let updated = parent_node.rename_child(new_id, &parent.slot_name, parent.index)?;
                self.nodes.insert(parent.node_id.clone(), Arc::new(updated));
                changed.insert(parent.node_id.clone());
            }
            None => self.root_id = Some(new_id.to_string()),
        }

        self.apply_moved(moved, changed)?;
        self.rewrite_references(node_id, new_id, changed)
    }

    /// Retarget bindings in the subtree of `new_id` that read outputs of
    /// `old_id`
    fn rewrite_references(
        &mut self,
        old_id: &str,
        new_id: &str,
        changed: &mut ChangedIds,
    ) -> Result<(), DocumentError> {
        for node_id in self.breadth_first(new_id) {
            let node = self.shared_node(&node_id)?;
            let mut updated = NodeData::clone(&node);
            let mut rewritten = false;

            for (input_name, index, expression) in node.bound_inputs() {
                let Some(json) = expression.rewrite_ancestor_reference(old_id, new_id) else {
                    continue;
                };
                let expression = self.validate_input(&node, &input_name, &json)?;
                updated = updated.set_input(Some(expression), &input_name, index)?;
                rewritten = true;
            }

            if rewritten {
                trace!(%node_id, %old_id, %new_id, "Rewrote ancestor references");
                self.nodes.insert(node_id.clone(), Arc::new(updated));
                changed.insert(node_id);
            }
        }
        Ok(())
    }

    fn set_node_input(
        &mut self,
        node_id: &str,
        input_name: &str,
        index: Option<u32>,
        expression: Option<&ExpressionJson>,
        changed: &mut ChangedIds,
    ) -> Result<(), DocumentError> {
        let node = self.shared_node(node_id)?;
        let expression = match expression {
            Some(json) => Some(self.validate_input(&node, input_name, json)?),
            None => None,
        };

        let updated = node.set_input(expression, input_name, index)?;
        self.nodes.insert(node_id.to_string(), Arc::new(updated));
        changed.insert(node_id.to_string());
        Ok(())
    }

    /// Build an expression for an input of `node`, checked against the
    /// input's declared type
    fn validate_input(
        &self,
        node: &NodeData,
        input_name: &str,
        json: &ExpressionJson,
    ) -> Result<Expression, DocumentError> {
        let attributes = node.schema().input_attributes(input_name)?;
        let context = DocumentContext {
            document: self,
            node_id: node.id(),
        };
        Ok(Expression::from_json(json, &attributes.ty, &context)?)
    }

    fn apply_moved(&mut self, moved: MovedChildren, changed: &mut ChangedIds) -> Result<(), DocumentError> {
        for (child_id, parent) in moved {
            let child = self.shared_node(&child_id)?;
            self.nodes.insert(child_id.clone(), Arc::new(child.move_to(parent)));
            changed.insert(child_id);
        }
        Ok(())
    }

    fn shared_node(&self, node_id: &str) -> Result<Arc<NodeData>, DocumentError> {
        self.nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| DocumentError::NodeNotFound {
                node_id: node_id.to_string(),
            })
    }

    /// `start` and its descendants, breadth-first
    fn breadth_first(&self, start: &str) -> Vec<String> {
        let mut ids = Vec::new();
        let mut queue = VecDeque::from([start.to_string()]);
        while let Some(node_id) = queue.pop_front() {
            if let Some(node) = self.nodes.get(&node_id) {
                queue.extend(node.child_ids());
                ids.push(node_id);
            }
        }
        ids
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("root_id", &self.root_id)
            .field("version", &self.version)
            .field("nodes", &self.nodes.len())
            .field("undo_entries", &self.undo_log.len())
            .finish()
    }
}

/// Resolves names for expressions bound on `node_id`
struct DocumentContext<'a> {
    document: &'a Document,
    node_id: &'a str,
}

impl ValidateExpressionContext for DocumentContext<'_> {
    fn json_literal_schema(&self, schema_name: &str) -> Result<&JsonLiteralSchema, ExpressionError> {
        Ok(self.document.definitions.get_json_literal(schema_name)?)
    }

    fn extension_method(&self, method_name: &str) -> Result<&ExtensionMethodDefinition, ExpressionError> {
        Ok(self.document.definitions.get_extension_method(method_name)?)
    }

    /// Walk up from the bound node; the output must be exposed through the
    /// slot the walk came through
    fn node_output_type(&self, node_id: &str, output_name: &str) -> Result<ValueType, ExpressionError> {
        let not_an_ancestor = || ExpressionError::NotAnAncestor {
            node_id: node_id.to_string(),
        };

        let mut current = self.document.nodes.get(self.node_id).ok_or_else(not_an_ancestor)?;
        while let Some(parent) = current.parent() {
            let ancestor = self
                .document
                .nodes
                .get(&parent.node_id)
                .ok_or_else(not_an_ancestor)?;

            if ancestor.id() == node_id {
                let output = ancestor.schema().output_attributes(output_name)?;
                if output
                    .slot
                    .as_ref()
                    .is_some_and(|slot| *slot != parent.slot_name)
                {
                    return Err(ExpressionError::OutputNotExposed {
                        node_id: node_id.to_string(),
                        output_name: output_name.to_string(),
                    });
                }
                return Ok(output.ty.clone());
            }
            current = ancestor;
        }

        Err(not_an_ancestor())
    }
}
