use super::load_definitions;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use initiative_schema::NodeSchema;

#[derive(Debug, Args)]
pub struct SchemasArgs {
    /// Definitions file (overrides config)
    #[arg(short, long)]
    pub definitions: Option<String>,
}

pub fn schemas(args: SchemasArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let definitions = load_definitions(args.definitions.as_deref(), &config, cwd)?;

    let schemas = definitions.node_schemas();
    if schemas.is_empty() {
        println!("{}", "⚠️  No node types defined".yellow());
        return Ok(());
    }

    for schema in schemas {
        print!("{}", describe(schema));
    }
    Ok(())
}

/// Multi-line summary of one node type
pub fn describe(schema: &NodeSchema) -> String {
    let mut out = format!("{}\n", schema.name().bright_white().bold());

    for (name, input) in schema.inputs() {
        out.push_str(&format!("  {} {}: {}\n", "input".cyan(), name, input.ty));
    }
    for (name, output) in schema.outputs() {
        match &output.slot {
            Some(slot) => out.push_str(&format!(
                "  {} {}: {} (slot {})\n",
                "output".green(),
                name,
                output.ty,
                slot
            )),
            None => out.push_str(&format!("  {} {}: {}\n", "output".green(), name, output.ty)),
        }
    }
    for (name, slot) in schema.slots() {
        match &slot.inputs {
            Some(inputs) => {
                out.push_str(&format!("  {} {}[]\n", "slot".magenta(), name));
                for (input_name, input) in inputs {
                    out.push_str(&format!("    {} {}: {}\n", "input".cyan(), input_name, input.ty));
                }
            }
            None => out.push_str(&format!("  {} {}\n", "slot".magenta(), name)),
        }
    }
    out
}
