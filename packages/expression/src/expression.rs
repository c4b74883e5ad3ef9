use crate::context::ValidateExpressionContext;
use crate::error::ExpressionError;
use crate::json::{ExpressionJson, SelectorJson};
use crate::visitor::VisitorMut;
use initiative_schema::ValueType;
use serde_json::Value;

/// A validated input binding with its resolved type
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    StringLiteral(String),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    JsonLiteral {
        schema_name: String,
        value: Value,
        ty: ValueType,
    },
    NodeOutput(NodeOutputExpression),
}

/// `<ancestor>::<output>` followed by property reads and calls
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutputExpression {
    pub node_id: String,
    pub output_name: String,
    pub selectors: Vec<Selector>,
    ty: ValueType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Property {
        property_name: String,
    },
    Method {
        method_name: String,
        args: Vec<Option<Expression>>,
    },
    Call {
        args: Vec<Option<Expression>>,
    },
}

impl Expression {
    /// Validate `json` and check that its type is assignable to `expected`
    pub fn from_json(
        json: &ExpressionJson,
        expected: &ValueType,
        ctx: &dyn ValidateExpressionContext,
    ) -> Result<Self, ExpressionError> {
        let expression = Self::resolve(json, ctx)?;
        let actual = expression.value_type();
        if !actual.is_assignable_to(expected) {
            return Err(ExpressionError::TypeMismatch {
                expected: expected.clone(),
                actual,
            });
        }
        Ok(expression)
    }

    fn resolve(
        json: &ExpressionJson,
        ctx: &dyn ValidateExpressionContext,
    ) -> Result<Self, ExpressionError> {
        match json {
            ExpressionJson::StringLiteral { value } => Ok(Expression::StringLiteral(value.clone())),
            ExpressionJson::NumberLiteral { value } => {
                if !value.is_finite() {
                    return Err(ExpressionError::InvalidExpression(format!(
                        "Number literal must be finite, got {}",
                        value
                    )));
                }
                Ok(Expression::NumberLiteral(*value))
            }
            ExpressionJson::BooleanLiteral { value } => Ok(Expression::BooleanLiteral(*value)),
            ExpressionJson::JsonLiteral { schema_name, value } => {
                let schema = ctx.json_literal_schema(schema_name)?;
                if !schema.ty.accepts_json(value) {
                    return Err(ExpressionError::InvalidExpression(format!(
                        "Value doesn't match JSON literal schema '{}'",
                        schema_name
                    )));
                }
                Ok(Expression::JsonLiteral {
                    schema_name: schema_name.clone(),
                    value: value.clone(),
                    ty: schema.ty.clone(),
                })
            }
            ExpressionJson::NodeOutput {
                node_id,
                output_name,
                selectors,
            } => {
                let mut ty = ctx.node_output_type(node_id, output_name)?;
                let mut resolved = Vec::with_capacity(selectors.len());
                for selector in selectors {
                    let (selector, next) = resolve_selector(selector, &ty, ctx)?;
                    resolved.push(selector);
                    ty = next;
                }
                Ok(Expression::NodeOutput(NodeOutputExpression {
                    node_id: node_id.clone(),
                    output_name: output_name.clone(),
                    selectors: resolved,
                    ty,
                }))
            }
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Expression::StringLiteral(_) => ValueType::String,
            Expression::NumberLiteral(_) => ValueType::Number,
            Expression::BooleanLiteral(_) => ValueType::Boolean,
            Expression::JsonLiteral { ty, .. } => ty.clone(),
            Expression::NodeOutput(expr) => expr.ty.clone(),
        }
    }

    pub fn to_json(&self) -> ExpressionJson {
        match self {
            Expression::StringLiteral(value) => ExpressionJson::StringLiteral {
                value: value.clone(),
            },
            Expression::NumberLiteral(value) => ExpressionJson::NumberLiteral { value: *value },
            Expression::BooleanLiteral(value) => ExpressionJson::BooleanLiteral { value: *value },
            Expression::JsonLiteral {
                schema_name, value, ..
            } => ExpressionJson::JsonLiteral {
                schema_name: schema_name.clone(),
                value: value.clone(),
            },
            Expression::NodeOutput(expr) => ExpressionJson::NodeOutput {
                node_id: expr.node_id.clone(),
                output_name: expr.output_name.clone(),
                selectors: expr.selectors.iter().map(Selector::to_json).collect(),
            },
        }
    }

    /// Retarget references to the ancestor `old_id` at `new_id`
    ///
    /// Returns `None` when nothing in this expression (including nested call
    /// arguments) refers to `old_id`.
    pub fn rewrite_ancestor_reference(&self, old_id: &str, new_id: &str) -> Option<ExpressionJson> {
        let mut json = self.to_json();
        let mut rewriter = RewriteNodeReference {
            old_id,
            new_id,
            changed: false,
        };
        rewriter.visit_expression_mut(&mut json);
        rewriter.changed.then_some(json)
    }
}

impl Selector {
    pub fn to_json(&self) -> SelectorJson {
        match self {
            Selector::Property { property_name } => SelectorJson::Property {
                property_name: property_name.clone(),
            },
            Selector::Method { method_name, args } => SelectorJson::Method {
                method_name: method_name.clone(),
                args: args_to_json(args),
            },
            Selector::Call { args } => SelectorJson::Call {
                args: args_to_json(args),
            },
        }
    }
}

fn args_to_json(args: &[Option<Expression>]) -> Vec<Option<ExpressionJson>> {
    args.iter()
        .map(|arg| arg.as_ref().map(Expression::to_json))
        .collect()
}

fn resolve_selector(
    selector: &SelectorJson,
    current: &ValueType,
    ctx: &dyn ValidateExpressionContext,
) -> Result<(Selector, ValueType), ExpressionError> {
    match selector {
        SelectorJson::Property { property_name } => {
            let ty = current.property_type(property_name).ok_or_else(|| {
                ExpressionError::InvalidExpression(format!(
                    "Property '{}' doesn't exist on type '{}'",
                    property_name, current
                ))
            })?;
            Ok((
                Selector::Property {
                    property_name: property_name.clone(),
                },
                ty,
            ))
        }
        SelectorJson::Method { method_name, args } => {
            let method = ctx.extension_method(method_name)?;
            if !current.is_assignable_to(&method.self_type) {
                return Err(ExpressionError::InvalidExpression(format!(
                    "Extension method '{}' can't be called on type '{}'",
                    method_name, current
                )));
            }
            let args = resolve_args(args, &method.params, ctx)?;
            Ok((
                Selector::Method {
                    method_name: method_name.clone(),
                    args,
                },
                method.returns.clone(),
            ))
        }
        SelectorJson::Call { args } => match current {
            ValueType::Function { params, returns } => {
                let args = resolve_args(args, params, ctx)?;
                Ok((Selector::Call { args }, returns.as_ref().clone()))
            }
            _ => Err(ExpressionError::InvalidExpression(format!(
                "Type '{}' is not callable",
                current
            ))),
        },
    }
}

fn resolve_args(
    args: &[Option<ExpressionJson>],
    params: &[ValueType],
    ctx: &dyn ValidateExpressionContext,
) -> Result<Vec<Option<Expression>>, ExpressionError> {
    if args.len() != params.len() {
        return Err(ExpressionError::InvalidExpression(format!(
            "Expected {} arguments, got {}",
            params.len(),
            args.len()
        )));
    }

    args.iter()
        .zip(params)
        .enumerate()
        .map(|(i, (arg, param))| match arg {
            Some(json) => Expression::from_json(json, param, ctx).map(Some),
            None if param.is_optional() => Ok(None),
            None => Err(ExpressionError::InvalidExpression(format!(
                "Missing required argument {}",
                i
            ))),
        })
        .collect()
}

struct RewriteNodeReference<'a> {
    old_id: &'a str,
    new_id: &'a str,
    changed: bool,
}

impl VisitorMut for RewriteNodeReference<'_> {
    fn visit_node_output_mut(&mut self, node_id: &mut String, _output_name: &mut String) {
        if node_id.as_str() == self.old_id {
            *node_id = self.new_id.to_string();
            self.changed = true;
        }
    }
}
