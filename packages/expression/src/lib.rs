//! # Initiative Expressions
//!
//! Values bound to node inputs.
//!
//! Expressions travel as [`ExpressionJson`] (the serde wire form) and are
//! validated into [`Expression`] against the type an input declares. An
//! expression may read an output of an ancestor node by id (`node-output`),
//! which is why renaming a node has to rewrite the expressions below it; see
//! [`Expression::rewrite_ancestor_reference`].

pub mod context;
pub mod error;
pub mod expression;
pub mod json;
pub mod visitor;

pub use context::ValidateExpressionContext;
pub use error::ExpressionError;
pub use expression::{Expression, NodeOutputExpression, Selector};
pub use json::{ExpressionJson, SelectorJson};
pub use visitor::{walk_expression_mut, walk_selector_mut, VisitorMut};
