//! External bundler lifecycle.
//!
//! The bundler owns module resolution, hot reload and production output.
//! This module only starts it, restarts it with a fresh environment and
//! runs one-shot production builds.

mod process;

#[cfg(test)]
mod fake;

pub use process::ProcessBundler;

#[cfg(test)]
pub use fake::{BundlerCall, FakeBundler, FakeServer};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::core::BuildMode;

/// Derived variables handed to the bundler process.
pub type EnvVars = BTreeMap<String, String>;

/// Environment flag: enable the Elm debugger
pub const DEBUG_FLAG: &str = "ELM_LAND_DEBUG";
/// Environment flag: compile Elm with `--optimize`
pub const OPTIMIZE_FLAG: &str = "ELM_LAND_OPTIMIZE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeOptions {
    pub port: u16,
    pub mode: BuildMode,
    pub debugger: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub out_dir: PathBuf,
    pub mode: BuildMode,
    pub debugger: bool,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("bundler command is empty")]
    EmptyCommand,

    #[error("bundler `{0}` not found")]
    NotFound(String, #[source] which::Error),

    #[error("failed to run bundler `{0}`")]
    Spawn(String, #[source] std::io::Error),

    #[error("failed to stop the dev server")]
    Stop(#[source] std::io::Error),

    #[error("bundler exited with {0}")]
    Failed(ExitStatus),

    #[error("dev server exited during startup ({0})")]
    Exited(ExitStatus),

    #[cfg(test)]
    #[error("{0}")]
    Other(String),
}

/// A running dev server.
#[allow(async_fn_in_trait)]
pub trait DevServer {
    /// Port the server actually listens on.
    fn port(&self) -> u16;

    /// Stop and start again so the new environment is picked up.
    async fn restart(&mut self, env: &EnvVars) -> Result<(), LifecycleError>;

    async fn stop(&mut self) -> Result<(), LifecycleError>;
}

#[allow(async_fn_in_trait)]
pub trait Bundler {
    type Server: DevServer;

    async fn serve(&self, opts: ServeOptions, env: &EnvVars) -> Result<Self::Server, LifecycleError>;

    async fn build(&self, opts: &BuildOptions, env: &EnvVars) -> Result<(), LifecycleError>;
}

/// Flags every bundler invocation receives on top of the derived variables.
pub fn mode_flags(mode: BuildMode, debugger: bool) -> [(&'static str, &'static str); 2] {
    let flag = |on: bool| if on { "true" } else { "false" };
    [
        (DEBUG_FLAG, flag(debugger)),
        (OPTIMIZE_FLAG, flag(mode.optimize)),
    ]
}
