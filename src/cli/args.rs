//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::effect::DEFAULT_PORT;

/// Development loop for code-generated Elm apps
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (default: nearest directory with elm-land.json)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Template directory (default: $DEVLOOP_TEMPLATES, else templates/ next to the binary)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub templates: Option<PathBuf>,

    /// Bundler command, run inside .elm-land/server
    #[arg(long, global = true, default_value = "npx vite")]
    pub bundler: String,

    /// Code generator command (JSON on stdin, JSON on stdout)
    #[arg(long, global = true, default_value = "elm-land-codegen")]
    pub generator: String,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the dev server and watch for changes
    #[command(visible_alias = "server")]
    Dev {
        /// Port for the dev server
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Build the app for production into dist/
    #[command(visible_alias = "b")]
    Build,

    /// Move a default file into src/ so it can be edited
    Customize {
        /// Customizable file name (e.g. `shared`, `view`, `not-found`)
        name: String,
    },

    /// Render .elm-land/server/index.html from elm-land.json
    Html,

    /// Run a JSON list of effects
    Run {
        /// File holding the effect list, or `-` for stdin
        #[arg(value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,
    },
}
