use std::path::{Path, PathBuf};

use notify::RecursiveMode;

use super::types::{ChangeKind, EventFilter, FsEvent, SubscriptionId};
use crate::core::ProjectPaths;
use crate::scaffold::CUSTOMIZABLE_FILES;

/// One watched concern: a set of paths and the kinds of change it reacts to.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub paths: Vec<PathBuf>,
    /// Also match everything beneath each path
    pub recursive: bool,
    pub reacts_to: EventFilter,
}

impl Subscription {
    fn covers(&self, path: &Path) -> bool {
        self.paths
            .iter()
            .any(|p| path == p || (self.recursive && path.starts_with(p)))
    }
}

/// The session's subscriptions, fixed at session start.
#[derive(Debug, Clone)]
pub struct Subscriptions(Vec<Subscription>);

impl Subscriptions {
    pub fn for_project(paths: &ProjectPaths) -> Self {
        Self(vec![
            Subscription {
                id: SubscriptionId::StaticAssets,
                paths: vec![paths.static_dir()],
                recursive: true,
                reacts_to: EventFilter::Any,
            },
            Subscription {
                id: SubscriptionId::ProjectConfig,
                paths: vec![paths.config_file()],
                recursive: false,
                reacts_to: EventFilter::ModifyOrCreate,
            },
            Subscription {
                id: SubscriptionId::Interop,
                paths: vec![paths.interop_file()],
                recursive: false,
                reacts_to: EventFilter::ModifyOrCreate,
            },
            Subscription {
                id: SubscriptionId::Sources,
                paths: vec![paths.pages_dir(), paths.layouts_dir()],
                recursive: true,
                reacts_to: EventFilter::Any,
            },
            Subscription {
                id: SubscriptionId::Customizables,
                paths: CUSTOMIZABLE_FILES
                    .iter()
                    .map(|file| paths.user_file(file.filepath))
                    .collect(),
                recursive: false,
                reacts_to: EventFilter::Any,
            },
        ])
    }

    /// Map debounced changes onto subscriptions, in change order.
    ///
    /// A path covered by several subscriptions yields one event for each.
    /// Changes no subscription accepts are dropped.
    pub fn route<I>(&self, changes: I) -> Vec<FsEvent>
    where
        I: IntoIterator<Item = (PathBuf, ChangeKind)>,
    {
        let mut events = Vec::new();
        for (path, kind) in changes {
            for sub in &self.0 {
                if sub.reacts_to.accepts(kind) && sub.covers(&path) {
                    events.push(FsEvent {
                        subscription: sub.id,
                        path: path.clone(),
                        kind,
                    });
                }
            }
        }
        events
    }

    /// Directories to hand to the watcher.
    ///
    /// Recursive subscriptions watch their own paths. Single files are
    /// watched through their parent directory so editors that replace a
    /// file on save do not detach the watch. Entries already covered by a
    /// recursive ancestor are dropped.
    pub fn watch_roots(&self) -> Vec<(PathBuf, RecursiveMode)> {
        let mut roots: Vec<(PathBuf, RecursiveMode)> = Vec::new();

        for sub in &self.0 {
            for path in &sub.paths {
                let root = if sub.recursive {
                    (path.clone(), RecursiveMode::Recursive)
                } else {
                    let Some(parent) = path.parent() else { continue };
                    (parent.to_path_buf(), RecursiveMode::NonRecursive)
                };
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
        }

        let recursive: Vec<PathBuf> = roots
            .iter()
            .filter(|(_, mode)| *mode == RecursiveMode::Recursive)
            .map(|(path, _)| path.clone())
            .collect();

        roots.retain(|(path, mode)| {
            !recursive
                .iter()
                .any(|r| path.starts_with(r) && (path != r || *mode == RecursiveMode::NonRecursive))
        });
        roots
    }
}
