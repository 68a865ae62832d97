//! Tool settings resolved from the command line and environment.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::core::ProjectPaths;
use crate::core::paths::CONFIG_FILE;
use crate::utils::path::normalize_path;

/// Environment variable overriding the template directory.
const TEMPLATES_ENV: &str = "DEVLOOP_TEMPLATES";

/// Where things live and which external programs to drive.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Project root (directory containing `elm-land.json`)
    pub root: PathBuf,
    /// Templates shipped with the tool (`customizable/`, `server/`, `src/`)
    pub templates: PathBuf,
    /// Bundler program and leading arguments
    pub bundler: Vec<String>,
    /// Code generator program and leading arguments
    pub generator: Vec<String>,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let root = match &cli.root {
            Some(root) => normalize_path(root),
            None => normalize_path(&find_project_root(&cwd).unwrap_or(cwd)),
        };

        let templates = match &cli.templates {
            Some(dir) => normalize_path(dir),
            None => default_templates()?,
        };

        let bundler = split_command(&cli.bundler);
        if bundler.is_empty() {
            bail!("--bundler must name a program");
        }
        let generator = split_command(&cli.generator);
        if generator.is_empty() {
            bail!("--generator must name a program");
        }

        Ok(Self {
            root,
            templates,
            bundler,
            generator,
        })
    }

    pub fn paths(&self) -> ProjectPaths {
        ProjectPaths::new(&self.root, &self.templates)
    }
}

/// Walk up from `start` looking for `elm-land.json`.
///
/// ```text
/// /home/user/app/src/Pages/   ← cwd
/// /home/user/app/elm-land.json ← found, root = /home/user/app
/// ```
fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

/// `$DEVLOOP_TEMPLATES`, else `templates/` next to the executable.
fn default_templates() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(TEMPLATES_ENV) {
        return Ok(normalize_path(Path::new(&dir)));
    }
    let exe = std::env::current_exe().context("Failed to locate the devloop executable")?;
    let dir = exe
        .parent()
        .map(|p| p.join("templates"))
        .context("executable has no parent directory")?;
    Ok(dir)
}

fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_project_root_walks_up() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        std::fs::write(root.join(CONFIG_FILE), "{}").unwrap();
        let nested = root.join("src/Pages");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), Some(root));
    }

    #[test]
    fn test_find_project_root_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_project_root(temp.path()), None);
    }

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("npx  vite"), vec!["npx", "vite"]);
        assert!(split_command("   ").is_empty());
    }
}
