use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

/// Starter definitions: a repository feeding a list that renders each article
pub const SAMPLE_DEFINITIONS: &str = r#"{
  "nodes": [
    {
      "name": "@demo/bloc::ArticleRepository",
      "outputs": {
        "articles": { "type": { "kind": "array", "element": { "kind": "entity", "name": "Article" } } }
      },
      "slots": { "child": {} }
    },
    {
      "name": "@demo/mui::List",
      "inputs": {
        "items": { "type": { "kind": "array", "element": { "kind": "entity", "name": "Article" } } }
      },
      "outputs": {
        "item": { "type": { "kind": "entity", "name": "Article" }, "slot": "renderItem" }
      },
      "slots": { "renderItem": {} }
    },
    {
      "name": "@demo/mui::Stack",
      "slots": {
        "children": { "inputs": { "grow": { "type": { "kind": "number" } } } }
      }
    },
    {
      "name": "@demo/mui::Typography",
      "inputs": {
        "text": { "type": { "kind": "string" } }
      }
    }
  ],
  "extensionMethods": [
    {
      "name": "Article::title",
      "selfType": { "kind": "entity", "name": "Article" },
      "returns": { "kind": "string" }
    }
  ]
}
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Definitions file to create
    #[arg(short, long, default_value = "definitions.json")]
    pub definitions: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing Initiative project...".bright_blue().bold()
    );

    let definitions_path = PathBuf::from(cwd).join(&args.definitions);
    if !definitions_path.exists() || args.force {
        fs::write(&definitions_path, SAMPLE_DEFINITIONS)?;
        println!("  {} Created {}", "✓".green(), args.definitions);
    }

    let config = Config {
        definitions: args.definitions.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: initiative schemas");
    println!("  2. Write a patches.json script");
    println!("  3. Run: initiative replay patches.json");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use initiative_schema::Definitions;

    #[test]
    fn test_sample_definitions_parse() {
        let definitions = Definitions::from_json_str(SAMPLE_DEFINITIONS).unwrap();

        let list = definitions.get_node("@demo/mui::List").unwrap();
        assert_eq!(list.type_prefix(), "List");
        assert_eq!(
            list.output_attributes("item").unwrap().slot.as_deref(),
            Some("renderItem")
        );
        assert!(definitions
            .get_node("@demo/mui::Stack")
            .unwrap()
            .is_collection_slot("children")
            .unwrap());
        assert!(definitions.get_extension_method("Article::title").is_ok());
    }

    #[test]
    fn test_init_writes_config_and_definitions() {
        let dir = std::env::temp_dir().join(format!("initiative-init-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let cwd = dir.display().to_string();

        init(
            InitArgs {
                definitions: "defs.json".to_string(),
                force: true,
            },
            &cwd,
        )
        .unwrap();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.definitions, "defs.json");
        assert!(Definitions::load(&config.get_definitions_path(&cwd)).is_ok());

        fs::remove_dir_all(&dir).unwrap();
    }
}
