use crate::json::{ExpressionJson, SelectorJson};

/// Mutable visitor over the expression wire form
///
/// Default methods walk the whole expression, including selector arguments.
/// Override specific `visit_*` methods to rewrite parts of it.
pub trait VisitorMut: Sized {
    fn visit_expression_mut(&mut self, expr: &mut ExpressionJson) {
        walk_expression_mut(self, expr);
    }

    fn visit_node_output_mut(&mut self, _node_id: &mut String, _output_name: &mut String) {
        // Leaf, nothing to walk
    }

    fn visit_selector_mut(&mut self, selector: &mut SelectorJson) {
        walk_selector_mut(self, selector);
    }
}

pub fn walk_expression_mut<V: VisitorMut>(visitor: &mut V, expr: &mut ExpressionJson) {
    match expr {
        ExpressionJson::NodeOutput {
            node_id,
            output_name,
            selectors,
        } => {
            visitor.visit_node_output_mut(node_id, output_name);
            for selector in selectors {
                visitor.visit_selector_mut(selector);
            }
        }
        ExpressionJson::StringLiteral { .. }
        | ExpressionJson::NumberLiteral { .. }
        | ExpressionJson::BooleanLiteral { .. }
        | ExpressionJson::JsonLiteral { .. } => {}
    }
}

pub fn walk_selector_mut<V: VisitorMut>(visitor: &mut V, selector: &mut SelectorJson) {
    match selector {
        SelectorJson::Method { args, .. } | SelectorJson::Call { args } => {
            for arg in args.iter_mut().flatten() {
                visitor.visit_expression_mut(arg);
            }
        }
        SelectorJson::Property { .. } => {}
    }
}
