pub mod init;
pub mod replay;
pub mod schemas;

pub use init::{init, InitArgs};
pub use replay::{replay, ReplayArgs};
pub use schemas::{schemas, SchemasArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use initiative_schema::Definitions;
use std::path::PathBuf;
use std::sync::Arc;

/// Definitions from `--definitions`, or from the config file's path
pub(crate) fn load_definitions(
    explicit: Option<&str>,
    config: &Config,
    cwd: &str,
) -> Result<Arc<Definitions>> {
    let path = match explicit {
        Some(path) => PathBuf::from(cwd).join(path),
        None => config.get_definitions_path(cwd),
    };

    let definitions = Definitions::load(&path)
        .with_context(|| format!("Failed to load definitions from {}", path.display()))?;
    Ok(Arc::new(definitions))
}
