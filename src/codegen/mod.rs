//! Generated Elm sources.
//!
//! ```text
//! src/Pages/**.elm ─┐
//!                   ├─> GeneratorInput ─> Generator ─> Vec<GeneratedFile> ─> .elm-land/src/**
//! src/Layouts/**.elm┘
//! ```
//!
//! The generator itself is opaque: anything implementing [`Generator`].
//! [`CommandGenerator`] drives an external program over a JSON protocol.

mod command;
mod engine;

pub use command::CommandGenerator;
pub use engine::{RegenReport, RegenerationEngine};

use serde::{Deserialize, Deserializer, Serialize};
use std::process::ExitStatus;
use thiserror::Error;

use crate::store::StoreError;

/// One page source handed to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSource {
    /// Route segments, e.g. `["Blog", "Id_"]` for `src/Pages/Blog/Id_.elm`
    pub filepath: Vec<String>,
    pub contents: String,
}

/// Everything the generator needs for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorInput {
    pub pages: Vec<PageSource>,
    /// Route segments of every layout, e.g. `["Sidebar"]`
    pub layouts: Vec<Vec<String>>,
}

/// One file produced by the generator, relative to `.elm-land/src`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path segments. Also accepts a single `/`-joined string on input.
    #[serde(deserialize_with = "deserialize_segments")]
    pub filepath: Vec<String>,
    #[serde(alias = "content")]
    pub contents: String,
}

impl GeneratedFile {
    pub fn new<I, S>(filepath: I, contents: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filepath: filepath.into_iter().map(Into::into).collect(),
            contents: contents.into(),
        }
    }

    /// `/`-joined relative path for display and path building.
    pub fn relative_path(&self) -> String {
        self.filepath.join("/")
    }
}

fn deserialize_segments<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Joined(String),
        Segments(Vec<String>),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Joined(path) => path.split('/').map(str::to_string).collect(),
        Repr::Segments(segments) => segments,
    })
}

/// Regeneration failure. Watch handlers log these and keep the previous
/// generated tree; only top-level effects turn them into problems.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("generator command is empty")]
    EmptyCommand,

    #[error("generator `{0}` not found")]
    NotFound(String, #[source] which::Error),

    #[error("failed to run generator `{0}`")]
    Spawn(String, #[source] std::io::Error),

    #[error("generator exited with {status}\n{stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("generator protocol error")]
    Protocol(#[from] serde_json::Error),

    #[error("generated file path `{0}` escapes the generated tree")]
    UnsafePath(String),

    #[error("{0}")]
    Other(String),
}

/// Opaque code generator.
#[allow(async_fn_in_trait)]
pub trait Generator {
    async fn generate(&self, input: &GeneratorInput) -> Result<Vec<GeneratedFile>, GenerationError>;
}

/// In-process generators, mostly for tests.
impl<F> Generator for F
where
    F: Fn(&GeneratorInput) -> Result<Vec<GeneratedFile>, GenerationError>,
{
    async fn generate(&self, input: &GeneratorInput) -> Result<Vec<GeneratedFile>, GenerationError> {
        self(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_file_accepts_joined_path() {
        let file: GeneratedFile =
            serde_json::from_str(r#"{ "filepath": "Pages/Home_.elm", "contents": "x" }"#).unwrap();
        assert_eq!(file.filepath, vec!["Pages", "Home_.elm"]);
    }

    #[test]
    fn test_generated_file_accepts_segments_and_content_alias() {
        let file: GeneratedFile =
            serde_json::from_str(r#"{ "filepath": ["Main.elm"], "content": "y" }"#).unwrap();
        assert_eq!(file, GeneratedFile::new(["Main.elm"], "y"));
    }

    #[test]
    fn test_input_serializes_segments() {
        let input = GeneratorInput {
            pages: vec![PageSource {
                filepath: vec!["Blog".into(), "Id_".into()],
                contents: "module Pages.Blog.Id_".into(),
            }],
            layouts: vec![vec!["Sidebar".into()]],
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["pages"][0]["filepath"], serde_json::json!(["Blog", "Id_"]));
        assert_eq!(json["layouts"], serde_json::json!([["Sidebar"]]));
    }
}
