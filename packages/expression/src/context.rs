use crate::error::ExpressionError;
use initiative_schema::{ExtensionMethodDefinition, JsonLiteralSchema, ValueType};

/// Lookups an expression needs while it is being validated
///
/// The document implements this per node: `node_output_type` only resolves
/// outputs of the node's ancestors that are exposed through the slot the
/// node hangs off.
pub trait ValidateExpressionContext {
    fn json_literal_schema(&self, schema_name: &str) -> Result<&JsonLiteralSchema, ExpressionError>;

    fn extension_method(&self, method_name: &str) -> Result<&ExtensionMethodDefinition, ExpressionError>;

    /// Fails with `NotAnAncestor` or `OutputNotExposed`
    fn node_output_type(&self, node_id: &str, output_name: &str) -> Result<ValueType, ExpressionError>;
}
