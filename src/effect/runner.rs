use thiserror::Error;

use super::{Effect, EffectResult};
use crate::bundler::{BuildOptions, Bundler, DevServer, LifecycleError, ServeOptions};
use crate::codegen::{GenerationError, Generator, RegenerationEngine};
use crate::config::{ConfigError, ProjectConfig};
use crate::core::{BuildMode, ProjectPaths};
use crate::env::EnvSyncState;
use crate::render;
use crate::scaffold::{Customization, ScaffoldSync};
use crate::store::{FileStore, StoreError};
use crate::watch::{FsWatcher, WatchError, WatchSession};

/// The watch session a dev server run hands back.
pub type Session<S, G, B> = WatchSession<S, G, <B as Bundler>::Server>;

/// Result of a run without problems.
pub struct Outcome<W> {
    /// Port of the dev server, when one was started
    pub port: Option<u16>,
    /// Watch session to drive for the rest of the process
    pub session: Option<W>,
}

/// Any failure inside a lifecycle step. Only logged; callers see the
/// effect's problem string.
#[derive(Debug, Error)]
enum StepError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// Performs effects one at a time, in order.
pub struct EffectRunner<S, G, B> {
    store: S,
    generator: G,
    bundler: B,
    paths: ProjectPaths,
    mode: BuildMode,
    env_lookup: fn(&str) -> Option<String>,
}

impl<S, G, B> EffectRunner<S, G, B>
where
    S: FileStore + Clone,
    G: Generator + Clone,
    B: Bundler,
{
    pub fn new(store: S, generator: G, bundler: B, paths: ProjectPaths) -> Self {
        Self {
            store,
            generator,
            bundler,
            paths,
            mode: BuildMode::from_node_env(),
            env_lookup: crate::env::process_env,
        }
    }

    /// Mode for the dev server (production builds are always production).
    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_env_lookup(mut self, lookup: fn(&str) -> Option<String>) -> Self {
        self.env_lookup = lookup;
        self
    }

    /// Run every effect, then report the first problem in effect order.
    ///
    /// Effects after a failing one still run.
    pub async fn run(&self, effects: Vec<Effect>) -> Result<Outcome<Session<S, G, B>>, String> {
        let mut results = Vec::with_capacity(effects.len());
        let mut port = None;
        let mut session = None;

        for effect in effects {
            let result = match effect {
                Effect::StartDevServer { port: requested } => match self.start_dev_server(requested).await {
                    Ok(started) => {
                        port = Some(started.port());
                        session = Some(started);
                        EffectResult {
                            problem: None,
                            port,
                        }
                    }
                    Err(e) => {
                        crate::log!("error"; "{}", e);
                        EffectResult::problem("❗️ Had trouble starting the server...")
                    }
                },
                Effect::RenderHtml { config } => self.render_html(config).await,
                Effect::ProductionBuild { config } => match self.production_build(config).await {
                    Ok(()) => EffectResult::ok(),
                    Err(e) => {
                        crate::log!("error"; "{}", e);
                        EffectResult::problem("❗️ Had trouble building the project...")
                    }
                },
                Effect::ApplyCustomization { filepath } => self.apply_customization(&filepath).await,
                Effect::Unrecognized { kind } => {
                    EffectResult::problem(format!("❗️ Unrecognized effect: {kind}"))
                }
            };
            results.push(result);
        }

        if let Some(problem) = results.into_iter().find_map(|r| r.problem) {
            return Err(problem);
        }
        Ok(Outcome { port, session })
    }

    fn engine(&self) -> RegenerationEngine<S, G> {
        RegenerationEngine::new(self.store.clone(), self.generator.clone(), self.paths.clone())
    }

    fn scaffold(&self) -> ScaffoldSync<S> {
        ScaffoldSync::new(self.store.clone(), self.paths.clone())
    }

    async fn load_config(&self, config: Option<ProjectConfig>) -> ProjectConfig {
        match config {
            Some(config) => config,
            None => ProjectConfig::load_or_default(&self.store, &self.paths.config_file()).await,
        }
    }

    /// Attach the watcher, install defaults, expose env, generate, then
    /// start the bundler. Edits made meanwhile wait in the watcher.
    /// A failed initial generation is reported but does not stop the server.
    async fn start_dev_server(&self, port: u16) -> Result<Session<S, G, B>, StepError> {
        let config = ProjectConfig::load(&self.store, &self.paths.config_file()).await?;
        let watcher = FsWatcher::for_project(&self.paths)?;

        self.scaffold().install_defaults().await?;

        let mut env = EnvSyncState::new();
        env.sync(&config, self.env_lookup);

        self.engine().regenerate_logged().await;

        let opts = ServeOptions {
            port,
            mode: self.mode,
            debugger: config.debugger(self.mode),
        };
        let server = self.bundler.serve(opts, env.exposed()).await?;
        crate::debug!("serve"; "bundler listening on port {}", server.port());

        Ok(WatchSession::start(
            self.store.clone(),
            self.generator.clone(),
            server,
            self.paths.clone(),
            env,
        )
        .with_env_lookup(self.env_lookup)
        .with_watcher(watcher))
    }

    async fn render_html(&self, config: Option<ProjectConfig>) -> EffectResult {
        let config = self.load_config(config).await;
        match render::write_index(&self.store, &self.paths, &config).await {
            Ok(_) => EffectResult::ok(),
            Err(e) => {
                crate::debug!("render"; "{}", e);
                EffectResult::problem("❗️ Could not create an HTML file from ./elm-land.json")
            }
        }
    }

    async fn production_build(&self, config: Option<ProjectConfig>) -> Result<(), StepError> {
        self.scaffold().install_defaults().await?;

        let config = self.load_config(config).await;
        let mut env = EnvSyncState::new();
        env.sync(&config, self.env_lookup);

        let report = self.engine().regenerate().await?;
        crate::debug!("codegen"; "generated {} file(s)", report.generated);

        let opts = BuildOptions {
            out_dir: self.paths.dist_dir(),
            mode: BuildMode::PRODUCTION,
            debugger: false,
        };
        self.bundler.build(&opts, env.exposed()).await?;
        crate::log!("bundler"; "built {}", opts.out_dir.display());
        Ok(())
    }

    async fn apply_customization(&self, filepath: &str) -> EffectResult {
        match self.scaffold().apply_customization(filepath).await {
            Ok(Customization::Created) => {
                crate::log!("scaffold"; "created src/{}", filepath);
                EffectResult::ok()
            }
            Ok(Customization::AlreadyCustomized) => {
                crate::log!("scaffold"; "src/{} is already customized", filepath);
                EffectResult::ok()
            }
            Err(e) => {
                crate::debug!("scaffold"; "{}", e);
                EffectResult::problem(format!("❗️ Could not customize {filepath}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{BundlerCall, EnvVars, FakeBundler};
    use crate::codegen::{GeneratedFile, GeneratorInput};
    use crate::scaffold::CUSTOMIZABLE_FILES;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::path::PathBuf;

    type Gen = fn(&GeneratorInput) -> Result<Vec<GeneratedFile>, GenerationError>;

    fn paths() -> ProjectPaths {
        ProjectPaths::new("/p", "/t")
    }

    fn generator(input: &GeneratorInput) -> Result<Vec<GeneratedFile>, GenerationError> {
        Ok(vec![GeneratedFile::new(
            ["Main.elm"],
            format!("pages: {}", input.pages.len()),
        )])
    }

    fn broken(_: &GeneratorInput) -> Result<Vec<GeneratedFile>, GenerationError> {
        Err(GenerationError::Other("parse error".into()))
    }

    fn lookup(name: &str) -> Option<String> {
        (name == "API_URL").then(|| "https://api.test".to_string())
    }

    fn project_store() -> MemoryStore {
        let store = MemoryStore::new();
        for file in CUSTOMIZABLE_FILES {
            store.seed(format!("/t/customizable/{}", file.filepath), file.name);
        }
        store.seed("/t/server/main.js", "import './interop.js'");
        store.seed("/t/src/Main.elm", "module Main");
        store.seed(
            "/p/elm-land.json",
            &json!({ "app": {
                "env": ["API_URL"],
                "elm": { "development": { "debugger": true } }
            } })
            .to_string(),
        );
        store.seed("/p/src/Pages/Home_.elm", "home");
        store
    }

    fn runner(store: &MemoryStore, generator: Gen, bundler: &FakeBundler) -> EffectRunner<MemoryStore, Gen, FakeBundler> {
        EffectRunner::new(store.clone(), generator, bundler.clone(), paths())
            .with_mode(BuildMode::DEVELOPMENT)
            .with_env_lookup(lookup)
    }

    fn api_env() -> EnvVars {
        EnvVars::from([("VITE_API_URL".to_string(), "https://api.test".to_string())])
    }

    #[tokio::test]
    async fn test_start_dev_server() {
        let store = project_store();
        let bundler = FakeBundler::new();

        let outcome = runner(&store, generator, &bundler)
            .run(vec![Effect::StartDevServer { port: 4000 }])
            .await
            .unwrap();

        assert_eq!(outcome.port, Some(4000));
        assert!(outcome.session.is_some());
        assert_eq!(
            bundler.calls(),
            vec![BundlerCall::Serve {
                port: 4000,
                env: api_env()
            }]
        );
        assert_eq!(store.contents("/p/.elm-land/src/Main.elm").as_deref(), Some("pages: 1"));
        assert!(store.contents("/p/.elm-land/server/main.js").is_some());
        assert!(store.contents("/p/.elm-land/src/Shared.elm").is_some());
    }

    #[tokio::test]
    async fn test_start_dev_server_without_config() {
        let store = project_store();
        store.remove(std::path::Path::new("/p/elm-land.json")).await.unwrap();
        let bundler = FakeBundler::new();

        let err = runner(&store, generator, &bundler)
            .run(vec![Effect::StartDevServer { port: 4000 }])
            .await
            .err();

        assert_eq!(err.as_deref(), Some("❗️ Had trouble starting the server..."));
        assert!(bundler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_dev_server_bundler_failure() {
        let store = project_store();
        let bundler = FakeBundler::failing_serve();

        let err = runner(&store, generator, &bundler)
            .run(vec![Effect::StartDevServer { port: 4000 }])
            .await
            .err();

        assert_eq!(err.as_deref(), Some("❗️ Had trouble starting the server..."));
    }

    #[tokio::test]
    async fn test_render_html_effect() {
        let store = project_store();
        let bundler = FakeBundler::new();
        let config = ProjectConfig::from_value(json!({ "app": { "html": { "title": "Inline" } } }));

        let outcome = runner(&store, generator, &bundler)
            .run(vec![Effect::RenderHtml { config: Some(config) }])
            .await
            .unwrap();

        assert_eq!(outcome.port, None);
        assert!(outcome.session.is_none());
        assert!(
            store
                .contents("/p/.elm-land/server/index.html")
                .is_some_and(|html| html.contains("<title>Inline</title>"))
        );
    }

    #[tokio::test]
    async fn test_production_build() {
        let store = project_store();
        let bundler = FakeBundler::new();

        runner(&store, generator, &bundler)
            .run(vec![Effect::ProductionBuild { config: None }])
            .await
            .unwrap();

        assert_eq!(
            bundler.calls(),
            vec![BundlerCall::Build {
                out_dir: PathBuf::from("/p/dist"),
                debugger: false,
                env: api_env(),
            }]
        );
        assert!(store.contents("/p/.elm-land/src/Main.elm").is_some());
    }

    #[tokio::test]
    async fn test_production_build_generation_failure() {
        let store = project_store();
        let bundler = FakeBundler::new();

        let err = runner(&store, broken, &bundler)
            .run(vec![Effect::ProductionBuild { config: None }])
            .await
            .err();

        assert_eq!(err.as_deref(), Some("❗️ Had trouble building the project..."));
        assert!(bundler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_production_build_bundler_failure() {
        let store = project_store();
        let bundler = FakeBundler::failing_build();

        let err = runner(&store, generator, &bundler)
            .run(vec![Effect::ProductionBuild { config: None }])
            .await
            .err();

        assert_eq!(err.as_deref(), Some("❗️ Had trouble building the project..."));
    }

    #[tokio::test]
    async fn test_apply_customization_effect() {
        let store = project_store();
        let bundler = FakeBundler::new();

        runner(&store, generator, &bundler)
            .run(vec![Effect::ApplyCustomization {
                filepath: "Shared/Model.elm".into(),
            }])
            .await
            .unwrap();

        assert_eq!(store.contents("/p/src/Shared/Model.elm").as_deref(), Some("shared/model"));
    }

    #[tokio::test]
    async fn test_first_problem_wins_and_later_effects_still_run() {
        let store = project_store();
        let bundler = FakeBundler::new();

        let err = runner(&store, generator, &bundler)
            .run(vec![
                Effect::Unrecognized { kind: "deploy".into() },
                Effect::ApplyCustomization {
                    filepath: "Nope.elm".into(),
                },
                Effect::RenderHtml { config: None },
            ])
            .await
            .err();

        assert_eq!(err.as_deref(), Some("❗️ Unrecognized effect: deploy"));
        assert!(store.contents("/p/.elm-land/server/index.html").is_some());
    }

    #[tokio::test]
    async fn test_customize_problem_names_path() {
        let store = project_store();
        let bundler = FakeBundler::new();

        let err = runner(&store, generator, &bundler)
            .run(vec![Effect::ApplyCustomization {
                filepath: "Nope.elm".into(),
            }])
            .await
            .err();

        assert_eq!(err.as_deref(), Some("❗️ Could not customize Nope.elm"));
    }
}
