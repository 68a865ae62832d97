//! devloop - development loop for code-generated Elm apps.

mod bundler;
mod cli;
mod codegen;
mod config;
mod core;
mod effect;
mod env;
mod logger;
mod render;
mod scaffold;
mod store;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};

use bundler::ProcessBundler;
use cli::Cli;
use codegen::CommandGenerator;
use config::Settings;
use effect::EffectRunner;
use store::LocalStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let settings = Settings::from_cli(&cli)?;
    let paths = settings.paths();
    debug!("config"; "project root: {}", paths.root().display());

    let effects = cli::effects(&cli.command)?;

    let runner = EffectRunner::new(
        LocalStore::new(),
        CommandGenerator::new(settings.generator.clone(), paths.root()),
        ProcessBundler::new(settings.bundler.clone(), paths.server_dir()),
        paths,
    );

    let outcome = match runner.run(effects).await {
        Ok(outcome) => outcome,
        Err(problem) => {
            eprintln!("{problem}");
            std::process::exit(1);
        }
    };

    if let Some(port) = outcome.port {
        log!("serve"; "http://localhost:{}", port);
    }
    if let Some(session) = outcome.session {
        session.run().await?;
    }

    Ok(())
}
