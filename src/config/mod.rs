//! Project configuration (`elm-land.json`) and tool settings.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error      # ConfigError
//! ├── field      # FieldPath + the consumed field constants
//! ├── settings   # Settings (CLI-derived tool settings)
//! └── mod.rs     # ProjectConfig (this file)
//! ```
//!
//! # Consumed fields
//!
//! | Field                              | Purpose                                 |
//! |------------------------------------|-----------------------------------------|
//! | `app.env`                          | env variable allow-list                 |
//! | `app.html.attributes.{html,head,body}` | attributes on the entry document    |
//! | `app.html.title`                   | `<title>` text                          |
//! | `app.html.meta` / `app.html.link`  | self-closing head tags                  |
//! | `app.elm.{development,production}.debugger` | Elm debugger toggle            |
//!
//! The config is partially present by nature. Every accessor treats a
//! missing or wrongly-typed path as absent instead of failing.

mod error;
pub mod field;
mod settings;

pub use error::ConfigError;
pub use field::FieldPath;
pub use settings::Settings;

use serde_json::{Map, Value};
use std::path::Path;

use crate::core::BuildMode;
use crate::store::FileStore;

/// Parsed `elm-land.json`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectConfig {
    value: Value,
}

impl ProjectConfig {
    pub fn from_value(value: Value) -> Self {
        Self { value }
    }

    /// Parse configuration from a JSON string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::from_value(serde_json::from_str(content)?))
    }

    /// Read and parse the config file.
    pub async fn load<S: FileStore>(store: &S, path: &Path) -> Result<Self, ConfigError> {
        let content = store.read(path).await?;
        Self::parse(&content)
    }

    /// Read and parse the config file, treating any failure as an empty config.
    pub async fn load_or_default<S: FileStore>(store: &S, path: &Path) -> Self {
        match Self::load(store, path).await {
            Ok(config) => config,
            Err(e) => {
                crate::debug!("config"; "using empty config: {}", e);
                Self::default()
            }
        }
    }

    pub fn get(&self, field: FieldPath) -> Option<&Value> {
        field.resolve(&self.value)
    }

    pub fn string(&self, field: FieldPath) -> Option<&str> {
        self.get(field)?.as_str()
    }

    pub fn bool(&self, field: FieldPath) -> Option<bool> {
        self.get(field)?.as_bool()
    }

    pub fn object(&self, field: FieldPath) -> Option<&Map<String, Value>> {
        self.get(field)?.as_object()
    }

    pub fn array(&self, field: FieldPath) -> Option<&[Value]> {
        self.get(field)?.as_array().map(Vec::as_slice)
    }

    /// The env allow-list, or `None` when `app.env` is missing or not an array.
    /// Non-string entries are skipped.
    pub fn env_names(&self) -> Option<Vec<String>> {
        let names = self.array(field::APP_ENV)?;
        Some(
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        )
    }

    /// Whether `app.elm.<mode>.debugger` is set.
    pub fn debugger(&self, mode: BuildMode) -> bool {
        let field = if mode.production {
            field::PRODUCTION_DEBUGGER
        } else {
            field::DEVELOPMENT_DEBUGGER
        };
        self.bool(field).unwrap_or(false)
    }
}
