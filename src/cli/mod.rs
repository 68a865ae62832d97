//! Command-line interface module.
//!
//! Every subcommand becomes a list of effects for the
//! [`EffectRunner`](crate::effect::EffectRunner).

mod args;

pub use args::{Cli, Commands};

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

use crate::effect::Effect;
use crate::scaffold::{CUSTOMIZABLE_FILES, find_customizable};

/// Effects performed for the chosen subcommand.
pub fn effects(command: &Commands) -> Result<Vec<Effect>> {
    let effects = match command {
        Commands::Dev { port } => vec![
            Effect::RenderHtml { config: None },
            Effect::StartDevServer { port: *port },
        ],
        Commands::Build => vec![
            Effect::RenderHtml { config: None },
            Effect::ProductionBuild { config: None },
        ],
        Commands::Customize { name } => {
            let Some(file) = find_customizable(name) else {
                let known: Vec<_> = CUSTOMIZABLE_FILES
                    .iter()
                    .map(|f| format!("  {:<12} {}", f.name, f.description))
                    .collect();
                bail!("unknown customizable file `{}`, expected one of:\n{}", name, known.join("\n"));
            };
            vec![Effect::ApplyCustomization {
                filepath: file.filepath.to_string(),
            }]
        }
        Commands::Html => vec![Effect::RenderHtml { config: None }],
        Commands::Run { path } => parse_effects(&read_input(path)?)?,
    };
    Ok(effects)
}

/// Decode a JSON array of tagged effects.
pub fn parse_effects(json: &str) -> Result<Vec<Effect>> {
    let value: Value = serde_json::from_str(json).context("effect list is not valid JSON")?;
    let Value::Array(items) = value else {
        bail!("effect list must be a JSON array");
    };
    Ok(items.iter().map(Effect::parse).collect())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read effects from stdin")?;
        return Ok(input);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
