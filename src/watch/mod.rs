//! Watch session
//!
//! Keeps the generated tree and the dev server in step with the user's
//! sources while the dev server runs.
//!
//! Architecture:
//! ```text
//! notify (thread) → channel → Debouncer (timing, dedup) → Subscriptions::route
//!     → FsEvent → WatchSession::dispatch (one handler at a time)
//! ```
//!
//! The watcher is attached before the initial build ([`FsWatcher`]), so
//! edits saved while the dev server starts are buffered, not lost.
//!
//! | Subscription     | Reacts to          | Handler                                  |
//! |------------------|--------------------|------------------------------------------|
//! | `static/`        | any                | touch `index.html`                       |
//! | `elm-land.json`  | modify / create    | render `index.html`, env sync, restart   |
//! | `src/interop.js` | modify / create    | touch `main.js`                          |
//! | Pages / Layouts  | any                | regenerate                               |
//! | customizables    | any                | sync customizable defaults               |

// Pure timing and deduplication.
mod debouncer;
// Path → subscription mapping.
mod subscription;
// Shared event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


pub use subscription::Subscriptions;
pub use types::{ChangeKind, FsEvent, SubscriptionId};

use std::path::PathBuf;

use notify::RecommendedWatcher;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::bundler::DevServer;
use crate::codegen::{Generator, RegenReport, RegenerationEngine};
use crate::config::ProjectConfig;
use crate::core::ProjectPaths;
use crate::env::EnvSyncState;
use crate::logger;
use crate::render;
use crate::scaffold::ScaffoldSync;
use crate::store::FileStore;
use debouncer::Debouncer;
use watch_roots::WatchRoots;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to start file watcher")]
    Notify(#[from] notify::Error),
}

/// What a dispatched event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    Touched(PathBuf),
    TouchFailed(PathBuf),
    ConfigReloaded { rendered: bool, restarted: bool },
    /// `None` when the pass failed and the previous tree was kept
    Regenerated(Option<RegenReport>),
    /// `None` when the sync failed
    CustomizablesSynced(Option<usize>),
}

/// File watcher attached ahead of the session that consumes it.
///
/// Events buffer in the channel until [`WatchSession::run`] starts reading.
pub struct FsWatcher {
    /// notify delivers on its own thread
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must be kept alive
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
}

impl FsWatcher {
    /// Create the watcher and attach every watch root that exists now.
    pub fn for_project(paths: &ProjectPaths) -> Result<Self, WatchError> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_roots = WatchRoots::new(Subscriptions::for_project(paths).watch_roots());
        watch_roots.attach_existing(&mut watcher);
        crate::debug!("watch"; "attached {} watch root(s)", watch_roots.attached());

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
        })
    }
}

/// Watch session started alongside a dev server.
pub struct WatchSession<S, G, D> {
    store: S,
    paths: ProjectPaths,
    engine: RegenerationEngine<S, G>,
    scaffold: ScaffoldSync<S>,
    server: D,
    env: EnvSyncState,
    env_lookup: fn(&str) -> Option<String>,
    subscriptions: Subscriptions,
    watcher: Option<FsWatcher>,
}

impl<S, G, D> WatchSession<S, G, D>
where
    S: FileStore + Clone,
    G: Generator,
    D: DevServer,
{
    /// `env` is the state the dev server was started with.
    pub fn start(store: S, generator: G, server: D, paths: ProjectPaths, env: EnvSyncState) -> Self {
        Self {
            engine: RegenerationEngine::new(store.clone(), generator, paths.clone()),
            scaffold: ScaffoldSync::new(store.clone(), paths.clone()),
            subscriptions: Subscriptions::for_project(&paths),
            store,
            paths,
            server,
            env,
            env_lookup: crate::env::process_env,
            watcher: None,
        }
    }

    /// Consume events from a watcher attached earlier.
    pub fn with_watcher(mut self, watcher: FsWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Replace the ambient environment lookup used on config reload.
    pub fn with_env_lookup(mut self, lookup: fn(&str) -> Option<String>) -> Self {
        self.env_lookup = lookup;
        self
    }

    pub fn port(&self) -> u16 {
        self.server.port()
    }

    pub fn env(&self) -> &EnvSyncState {
        &self.env
    }

    /// Run the handler for one event. Handler failures are reported on the
    /// status line and never end the session.
    pub async fn dispatch(&mut self, event: &FsEvent) -> Reaction {
        crate::debug!("watch"; "{}: {}", event.kind.label(), event.path.display());

        match event.subscription {
            SubscriptionId::StaticAssets => self.touch(self.paths.index_html()).await,
            SubscriptionId::ProjectConfig => self.reload_config().await,
            SubscriptionId::Interop => self.touch(self.paths.main_js()).await,
            SubscriptionId::Sources => Reaction::Regenerated(self.engine.regenerate_logged().await),
            SubscriptionId::Customizables => {
                Reaction::CustomizablesSynced(self.scaffold.sync_logged().await)
            }
        }
    }

    /// Dispatch a batch, running each subscription's handler at most once,
    /// in order of its first event.
    pub async fn dispatch_batch(&mut self, events: &[FsEvent]) -> Vec<Reaction> {
        let mut seen = Vec::new();
        let mut reactions = Vec::new();

        for event in events {
            if seen.contains(&event.subscription) {
                continue;
            }
            seen.push(event.subscription);
            reactions.push(self.dispatch(event).await);
        }
        reactions
    }

    /// Route a debounced batch and dispatch it.
    pub async fn handle_changes(&mut self, changes: Vec<(PathBuf, ChangeKind)>) -> Vec<Reaction> {
        let events = self.subscriptions.route(changes);
        self.dispatch_batch(&events).await
    }

    /// Watch until Ctrl+C, then stop the dev server.
    pub async fn run(self) -> Result<(), WatchError> {
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        crate::core::register_session(shutdown_tx);
        self.run_until(shutdown_rx).await
    }

    /// Watch until `shutdown` fires, then stop the dev server.
    ///
    /// Without an attached [`FsWatcher`] one is created here. Every event
    /// buffered since the watcher was attached is handled.
    pub async fn run_until(mut self, mut shutdown: mpsc::UnboundedReceiver<()>) -> Result<(), WatchError> {
        let FsWatcher {
            notify_rx,
            mut watcher,
            mut watch_roots,
        } = match self.watcher.take() {
            Some(watcher) => watcher,
            None => FsWatcher::for_project(&self.paths)?,
        };

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        crate::log!("watch"; "watching {} for changes", self.paths.root().display());

        let mut debouncer = Debouncer::new();
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    if let Some(changes) = debouncer.take_if_ready() {
                        self.handle_changes(changes).await;
                    }
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Stop the dev server. Failure is logged; the process is exiting anyway.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.server.stop().await {
            crate::log!("error"; "{}", e);
        }
    }

    async fn touch(&self, path: PathBuf) -> Reaction {
        match self.store.touch(&path).await {
            Ok(()) => Reaction::Touched(path),
            Err(e) => {
                logger::status_error("touch failed", &e.to_string());
                Reaction::TouchFailed(path)
            }
        }
    }

    /// Re-read the config, re-render the entry document and re-derive the
    /// exposed environment. A changed environment restarts the dev server.
    async fn reload_config(&mut self) -> Reaction {
        let config = ProjectConfig::load_or_default(&self.store, &self.paths.config_file()).await;

        let rendered = match render::write_index(&self.store, &self.paths, &config).await {
            Ok(_) => true,
            Err(e) => {
                logger::status_error("Could not create an HTML file from ./elm-land.json", &e.to_string());
                false
            }
        };

        let mut restarted = false;
        if self.env.sync(&config, self.env_lookup) {
            match self.server.restart(self.env.exposed()).await {
                Ok(()) => {
                    logger::status_success("environment changed, dev server restarted");
                    restarted = true;
                }
                Err(e) => logger::status_error("Had trouble restarting the server", &e.to_string()),
            }
        } else if rendered {
            logger::status_success("reloaded elm-land.json");
        }

        Reaction::ConfigReloaded { rendered, restarted }
    }
}
