use initiative_editor::{DocumentConfig, UndoConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "initiative.config.json";

/// Initiative configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Node schema definitions, relative to the config file
    #[serde(default = "default_definitions")]
    pub definitions: String,

    /// Undo history options
    #[serde(default)]
    pub undo: UndoConfig,
}

fn default_definitions() -> String {
    "definitions.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the definitions file
    pub fn get_definitions_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.definitions)
    }

    pub fn document_config(&self) -> DocumentConfig {
        DocumentConfig {
            undo: self.undo.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            definitions: default_definitions(),
            undo: UndoConfig::default(),
        }
    }
}
