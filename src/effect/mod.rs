//! Effects: the intents a command asks the orchestrator to perform.
//!
//! Effects arrive as JSON objects tagged by `kind`, or are built directly
//! by the CLI. They run strictly one after another; see [`EffectRunner`].

mod runner;

pub use runner::EffectRunner;

use serde_json::Value;

use crate::config::ProjectConfig;

/// Dev server port when none is given.
pub const DEFAULT_PORT: u16 = 1234;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartDevServer { port: u16 },
    /// `None` reads `elm-land.json` from the project
    RenderHtml { config: Option<ProjectConfig> },
    ProductionBuild { config: Option<ProjectConfig> },
    ApplyCustomization { filepath: String },
    Unrecognized { kind: String },
}

impl Effect {
    /// Decode one tagged effect. Never fails: anything unknown becomes
    /// [`Effect::Unrecognized`] and is reported when it runs.
    ///
    /// | `kind`                              | Fields                              |
    /// |-------------------------------------|-------------------------------------|
    /// | `runServer` / `startDevServer`      | `options.port` or `port`            |
    /// | `generateHtml` / `renderHtml`       | `config` (optional)                 |
    /// | `build` / `productionBuild`         | `config` (optional)                 |
    /// | `customize` / `applyCustomization`  | `filepath`                          |
    pub fn parse(value: &Value) -> Self {
        let config = || value.get("config").cloned().map(ProjectConfig::from_value);

        match value.get("kind") {
            Some(Value::String(kind)) => match kind.as_str() {
                "runServer" | "startDevServer" => Self::StartDevServer {
                    port: parse_port(value).unwrap_or(DEFAULT_PORT),
                },
                "generateHtml" | "renderHtml" => Self::RenderHtml { config: config() },
                "build" | "productionBuild" => Self::ProductionBuild { config: config() },
                "customize" | "applyCustomization" => Self::ApplyCustomization {
                    filepath: value
                        .get("filepath")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                },
                other => Self::Unrecognized { kind: other.to_string() },
            },
            Some(other) => Self::Unrecognized { kind: other.to_string() },
            None => Self::Unrecognized {
                kind: "<missing>".to_string(),
            },
        }
    }
}

fn parse_port(value: &Value) -> Option<u16> {
    value
        .pointer("/options/port")
        .or_else(|| value.get("port"))
        .and_then(Value::as_u64)
        .and_then(|port| u16::try_from(port).ok())
}

/// What a single effect produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectResult {
    pub problem: Option<String>,
    pub port: Option<u16>,
}

impl EffectResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn problem(problem: impl Into<String>) -> Self {
        Self {
            problem: Some(problem.into()),
            port: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_kinds_and_aliases() {
        assert_eq!(
            Effect::parse(&json!({ "kind": "runServer", "options": { "port": 3000 } })),
            Effect::StartDevServer { port: 3000 }
        );
        assert_eq!(
            Effect::parse(&json!({ "kind": "startDevServer", "port": 8080 })),
            Effect::StartDevServer { port: 8080 }
        );
        assert_eq!(
            Effect::parse(&json!({ "kind": "customize", "filepath": "View.elm" })),
            Effect::ApplyCustomization {
                filepath: "View.elm".into()
            }
        );
        assert_eq!(
            Effect::parse(&json!({ "kind": "productionBuild" })),
            Effect::ProductionBuild { config: None }
        );
    }

    #[test]
    fn test_parse_carries_inline_config() {
        let effect = Effect::parse(&json!({
            "kind": "generateHtml",
            "config": { "app": { "html": { "title": "Hi" } } }
        }));
        let Effect::RenderHtml { config: Some(config) } = &effect else {
            panic!("expected inline config, got {effect:?}");
        };
        assert_eq!(config.string(crate::config::field::HTML_TITLE), Some("Hi"));
    }

    #[test]
    fn test_parse_default_port() {
        assert_eq!(
            Effect::parse(&json!({ "kind": "runServer", "options": { "port": 70000 } })),
            Effect::StartDevServer { port: DEFAULT_PORT }
        );
        assert_eq!(
            Effect::parse(&json!({ "kind": "runServer" })),
            Effect::StartDevServer { port: DEFAULT_PORT }
        );
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(
            Effect::parse(&json!({ "kind": "deploy" })),
            Effect::Unrecognized {
                kind: "deploy".into()
            }
        );
        assert_eq!(
            Effect::parse(&json!({ "kind": 7 })),
            Effect::Unrecognized { kind: "7".into() }
        );
        assert_eq!(
            Effect::parse(&json!({})),
            Effect::Unrecognized {
                kind: "<missing>".into()
            }
        );
    }
}
