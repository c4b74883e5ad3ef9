//! # Value Types
//!
//! Structural type system for node inputs and outputs.
//!
//! Types are compared with [`ValueType::is_assignable_to`], which answers
//! "can a value of `self` be bound where `target` is expected". JSON literal
//! values are checked with [`ValueType::accepts_json`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValueType {
    Any,
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
    Array {
        element: Box<ValueType>,
    },
    Tuple {
        elements: Vec<ValueType>,
    },
    Object {
        properties: IndexMap<String, ValueType>,
    },
    Union {
        variants: Vec<ValueType>,
    },
    Function {
        params: Vec<ValueType>,
        returns: Box<ValueType>,
    },
    /// Opaque named type, only assignable to itself
    Entity {
        name: String,
    },
}

impl ValueType {
    pub fn array(element: ValueType) -> Self {
        ValueType::Array {
            element: Box::new(element),
        }
    }

    pub fn tuple(elements: Vec<ValueType>) -> Self {
        ValueType::Tuple { elements }
    }

    pub fn object<K: Into<String>>(properties: impl IntoIterator<Item = (K, ValueType)>) -> Self {
        ValueType::Object {
            properties: properties
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        }
    }

    pub fn union(variants: Vec<ValueType>) -> Self {
        ValueType::Union { variants }
    }

    /// `T | undefined`
    pub fn optional(ty: ValueType) -> Self {
        ValueType::Union {
            variants: vec![ty, ValueType::Undefined],
        }
    }

    pub fn function(params: Vec<ValueType>, returns: ValueType) -> Self {
        ValueType::Function {
            params,
            returns: Box::new(returns),
        }
    }

    pub fn entity(name: impl Into<String>) -> Self {
        ValueType::Entity { name: name.into() }
    }

    /// Whether `undefined` may be bound here (missing values are allowed)
    pub fn is_optional(&self) -> bool {
        ValueType::Undefined.is_assignable_to(self)
    }

    pub fn is_assignable_to(&self, target: &ValueType) -> bool {
        use ValueType::*;

        match (self, target) {
            (_, Any) => true,
            (Union { variants }, _) => variants.iter().all(|v| v.is_assignable_to(target)),
            (_, Union { variants }) => variants.iter().any(|v| self.is_assignable_to(v)),
            (String, String)
            | (Number, Number)
            | (Boolean, Boolean)
            | (Null, Null)
            | (Undefined, Undefined)
            | (Void, Void) => true,
            (Array { element: source }, Array { element: target }) => {
                source.is_assignable_to(target)
            }
            (Tuple { elements: source }, Tuple { elements: target }) => {
                source.len() == target.len()
                    && source
                        .iter()
                        .zip(target)
                        .all(|(s, t)| s.is_assignable_to(t))
            }
            (Tuple { elements }, Array { element }) => {
                elements.iter().all(|e| e.is_assignable_to(element))
            }
            (Object { properties: source }, Object { properties: target }) => {
                target.iter().all(|(name, target_ty)| match source.get(name) {
                    Some(source_ty) => source_ty.is_assignable_to(target_ty),
                    None => target_ty.is_optional(),
                })
            }
            (
                Function {
                    params: source_params,
                    returns: source_returns,
                },
                Function {
                    params: target_params,
                    returns: target_returns,
                },
            ) => {
                // Parameters are contravariant
                source_params.len() == target_params.len()
                    && target_params
                        .iter()
                        .zip(source_params)
                        .all(|(t, s)| t.is_assignable_to(s))
                    && source_returns.is_assignable_to(target_returns)
            }
            (Entity { name: source }, Entity { name: target }) => source == target,
            _ => false,
        }
    }

    /// Check a raw JSON value against this type
    pub fn accepts_json(&self, value: &Value) -> bool {
        use ValueType::*;

        match self {
            Any => true,
            String => value.is_string(),
            Number => value.is_number(),
            Boolean => value.is_boolean(),
            Null => value.is_null(),
            Undefined | Void | Function { .. } | Entity { .. } => false,
            Array { element } => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| element.accepts_json(item))),
            Tuple { elements } => value.as_array().is_some_and(|items| {
                items.len() == elements.len()
                    && items.iter().zip(elements).all(|(item, ty)| ty.accepts_json(item))
            }),
            Object { properties } => value.as_object().is_some_and(|object| {
                properties.iter().all(|(name, ty)| match object.get(name) {
                    Some(field) => ty.accepts_json(field),
                    None => ty.is_optional(),
                })
            }),
            Union { variants } => variants.iter().any(|v| v.accepts_json(value)),
        }
    }

    /// Type of `self.<name>`, if the property exists
    pub fn property_type(&self, name: &str) -> Option<ValueType> {
        match self {
            ValueType::Object { properties } => properties.get(name).cloned(),
            ValueType::Array { .. } | ValueType::Tuple { .. } | ValueType::String
                if name == "length" =>
            {
                Some(ValueType::Number)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Any => f.write_str("any"),
            ValueType::String => f.write_str("string"),
            ValueType::Number => f.write_str("number"),
            ValueType::Boolean => f.write_str("boolean"),
            ValueType::Null => f.write_str("null"),
            ValueType::Undefined => f.write_str("undefined"),
            ValueType::Void => f.write_str("void"),
            ValueType::Array { element } => match element.as_ref() {
                ValueType::Union { .. } | ValueType::Function { .. } => write!(f, "({})[]", element),
                _ => write!(f, "{}[]", element),
            },
            ValueType::Tuple { elements } => {
                f.write_str("[")?;
                write_joined(f, elements, ", ")?;
                f.write_str("]")
            }
            ValueType::Object { properties } => {
                f.write_str("{ ")?;
                for (i, (name, ty)) in properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}: {}", name, ty)?;
                }
                f.write_str(" }")
            }
            ValueType::Union { variants } => write_joined(f, variants, " | "),
            ValueType::Function { params, returns } => {
                f.write_str("(")?;
                write_joined(f, params, ", ")?;
                write!(f, ") => {}", returns)
            }
            ValueType::Entity { name } => f.write_str(name),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[ValueType], separator: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives() {
        assert!(ValueType::String.is_assignable_to(&ValueType::String));
        assert!(!ValueType::String.is_assignable_to(&ValueType::Number));
        assert!(ValueType::Number.is_assignable_to(&ValueType::Any));
        assert!(!ValueType::Any.is_assignable_to(&ValueType::Number));
    }

    #[test]
    fn test_unions() {
        let string_or_number = ValueType::union(vec![ValueType::String, ValueType::Number]);

        assert!(ValueType::String.is_assignable_to(&string_or_number));
        assert!(!string_or_number.is_assignable_to(&ValueType::String));
        assert!(string_or_number.is_assignable_to(&ValueType::union(vec![
            ValueType::Number,
            ValueType::Boolean,
            ValueType::String,
        ])));
        assert!(ValueType::optional(ValueType::Number).is_optional());
        assert!(!ValueType::Number.is_optional());
    }

    #[test]
    fn test_arrays_and_tuples() {
        let numbers = ValueType::array(ValueType::Number);
        let pair = ValueType::tuple(vec![ValueType::Number, ValueType::Number]);

        assert!(pair.is_assignable_to(&numbers));
        assert!(!numbers.is_assignable_to(&pair));
        assert!(!ValueType::tuple(vec![ValueType::Number]).is_assignable_to(&pair));
    }

    #[test]
    fn test_objects_are_structural() {
        let article = ValueType::object([
            ("id", ValueType::Number),
            ("title", ValueType::String),
        ]);
        let with_id = ValueType::object([("id", ValueType::Number)]);
        let with_optional_tag = ValueType::object([
            ("id", ValueType::Number),
            ("tag", ValueType::optional(ValueType::String)),
        ]);

        assert!(article.is_assignable_to(&with_id));
        assert!(!with_id.is_assignable_to(&article));
        assert!(article.is_assignable_to(&with_optional_tag));
    }

    #[test]
    fn test_functions_are_contravariant_in_params() {
        let takes_any = ValueType::function(vec![ValueType::Any], ValueType::Void);
        let takes_string = ValueType::function(vec![ValueType::String], ValueType::Void);

        assert!(takes_any.is_assignable_to(&takes_string));
        assert!(!takes_string.is_assignable_to(&takes_any));
    }

    #[test]
    fn test_entities_match_by_name() {
        assert!(ValueType::entity("Article").is_assignable_to(&ValueType::entity("Article")));
        assert!(!ValueType::entity("Article").is_assignable_to(&ValueType::entity("User")));
    }

    #[test]
    fn test_accepts_json() {
        let article = ValueType::object([
            ("id", ValueType::Number),
            ("tags", ValueType::array(ValueType::String)),
            ("note", ValueType::optional(ValueType::String)),
        ]);

        assert!(article.accepts_json(&json!({ "id": 1, "tags": ["a"] })));
        assert!(!article.accepts_json(&json!({ "id": "1", "tags": [] })));
        assert!(!article.accepts_json(&json!({ "tags": [] })));
        assert!(!ValueType::entity("Article").accepts_json(&json!({})));
    }

    #[test]
    fn test_display() {
        let ty = ValueType::function(
            vec![ValueType::array(ValueType::optional(ValueType::Number))],
            ValueType::Void,
        );
        assert_eq!(ty.to_string(), "((number | undefined)[]) => void");
    }

    #[test]
    fn test_serde_uses_kind_tag() {
        let ty: ValueType =
            serde_json::from_value(json!({ "kind": "array", "element": { "kind": "string" } }))
                .unwrap();
        assert_eq!(ty, ValueType::array(ValueType::String));
    }
}
