//! # Initiative Editor
//!
//! Document engine for the visual program editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: node types, value types             │
//! │ expression: input bindings, validation      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + patches + undo log       │
//! │  - Copy-on-write node tree                  │
//! │  - All-or-nothing patch application         │
//! │  - Grouped, debounced undo                  │
//! │  - Ordered change / patch notifications     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use initiative_editor::{Document, Patch};
//!
//! let mut doc = Document::new("App", definitions);
//! let root = doc.apply_patch(Patch::create_root("Root"))?;
//! doc.apply_patch(Patch::create_child("Leaf", "Root1", "child"))?;
//!
//! doc.apply_patch(Patch::delete("Root1"))?;
//! doc.undo()?; // both nodes are back
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod node;
pub mod patch;
pub mod undo_log;

pub use config::{DocumentConfig, UndoConfig};
pub use document::{Document, DocumentObserver, PatchResult};
pub use error::{DocumentError, NodeError};
pub use node::{input_key, MovedChildren, NodeData, NodeParent, SlotChildren};
pub use patch::{Patch, PatchParent};
pub use undo_log::{UndoEntry, UndoLog};
