//! Serde wire form of expressions
//!
//! ```json
//! { "type": "node-output", "nodeId": "ArticleRepository1", "outputName": "articles",
//!   "selectors": [{ "type": "property", "propertyName": "length" }] }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExpressionJson {
    StringLiteral {
        value: String,
    },

    NumberLiteral {
        value: f64,
    },

    BooleanLiteral {
        value: bool,
    },

    /// Free-form JSON validated against a named literal schema
    #[serde(rename_all = "camelCase")]
    JsonLiteral {
        schema_name: String,
        value: Value,
    },

    /// Reads an output of an ancestor node
    #[serde(rename_all = "camelCase")]
    NodeOutput {
        node_id: String,
        output_name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        selectors: Vec<SelectorJson>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SelectorJson {
    #[serde(rename_all = "camelCase")]
    Property { property_name: String },

    /// Extension method call; `null` arguments are omitted optional params
    #[serde(rename_all = "camelCase")]
    Method {
        method_name: String,
        #[serde(default)]
        args: Vec<Option<ExpressionJson>>,
    },

    Call {
        #[serde(default)]
        args: Vec<Option<ExpressionJson>>,
    },
}

impl ExpressionJson {
    pub fn string(value: impl Into<String>) -> Self {
        ExpressionJson::StringLiteral {
            value: value.into(),
        }
    }

    pub fn number(value: f64) -> Self {
        ExpressionJson::NumberLiteral { value }
    }

    pub fn boolean(value: bool) -> Self {
        ExpressionJson::BooleanLiteral { value }
    }

    pub fn node_output(node_id: impl Into<String>, output_name: impl Into<String>) -> Self {
        ExpressionJson::NodeOutput {
            node_id: node_id.into(),
            output_name: output_name.into(),
            selectors: Vec::new(),
        }
    }
}
