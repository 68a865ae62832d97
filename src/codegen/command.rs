//! External generator process.
//!
//! Protocol: the generator receives a JSON [`GeneratorInput`] on stdin and
//! prints a JSON array of [`GeneratedFile`] on stdout. A non-zero exit is a
//! failure; stderr is carried into the error.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{GeneratedFile, GenerationError, Generator, GeneratorInput};

/// Runs a generator program once per regeneration pass.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: Vec<String>,
    cwd: PathBuf,
}

impl CommandGenerator {
    /// `program` is the executable followed by its leading arguments.
    pub fn new(program: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program,
            cwd: cwd.into(),
        }
    }
}

impl Generator for CommandGenerator {
    async fn generate(&self, input: &GeneratorInput) -> Result<Vec<GeneratedFile>, GenerationError> {
        let (name, args) = self
            .program
            .split_first()
            .ok_or(GenerationError::EmptyCommand)?;
        let program = which::which(name).map_err(|e| GenerationError::NotFound(name.clone(), e))?;

        let payload = serde_json::to_vec(input)?;

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GenerationError::Spawn(name.clone(), e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| GenerationError::Other("generator stdin unavailable".into()))?;

        // Feed stdin while draining stdout so large payloads cannot deadlock.
        let feed = async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| GenerationError::Spawn(name.clone(), e))?;

        if !output.status.success() {
            return Err(GenerationError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // A generator may legitimately exit before reading all of stdin.
        if let Err(e) = fed {
            crate::debug!("codegen"; "generator closed stdin early: {}", e);
        }

        let files: Vec<GeneratedFile> = serde_json::from_slice(&output.stdout)?;
        crate::debug!("codegen"; "generator returned {} file(s)", files.len());
        Ok(files)
    }
}
