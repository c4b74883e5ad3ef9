//! Document configuration
//!
//! Loaded by the CLI from the `undo` table of `initiative.config.json`:
//!
//! ```json
//! { "undo": { "debounceMs": 200, "maxGroups": 100, "recordFirstBinding": true } }
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    #[serde(default)]
    pub undo: UndoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoConfig {
    /// Edits to the same input closer than this collapse into one undo step
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Number of undo groups kept; `0` keeps everything
    #[serde(default = "default_max_groups")]
    pub max_groups: usize,

    /// Log an undo entry when an input that had no value is bound
    #[serde(default = "default_record_first_binding")]
    pub record_first_binding: bool,
}

fn default_debounce_ms() -> u64 {
    200
}

fn default_max_groups() -> usize {
    100
}

fn default_record_first_binding() -> bool {
    true
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_groups: default_max_groups(),
            record_first_binding: default_record_first_binding(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: DocumentConfig =
            serde_json::from_str(r#"{ "undo": { "debounceMs": 50 } }"#).unwrap();

        assert_eq!(config.undo.debounce_ms, 50);
        assert_eq!(config.undo.max_groups, 100);
        assert!(config.undo.record_first_binding);
    }

    #[test]
    fn test_empty_object() {
        let config: DocumentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DocumentConfig::default());
    }
}
