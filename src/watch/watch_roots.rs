use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// What root management needs from a watcher.
pub(super) trait RootWatcher {
    fn watch_root(&mut self, path: &Path, mode: RecursiveMode) -> notify::Result<()>;
}

impl RootWatcher for RecommendedWatcher {
    fn watch_root(&mut self, path: &Path, mode: RecursiveMode) -> notify::Result<()> {
        self.watch(path, mode)
    }
}

/// Keeps the watcher attached to every desired root that exists.
///
/// Roots missing at startup are attached once they appear, and roots that
/// were removed and recreated are re-attached.
pub(super) struct WatchRoots {
    desired: Vec<(PathBuf, RecursiveMode)>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(roots: Vec<(PathBuf, RecursiveMode)>) -> Self {
        Self {
            desired: roots,
            attached: FxHashSet::default(),
        }
    }

    /// Attach every root that exists now. A root that cannot be attached
    /// is logged and skipped; the rest of the session still runs.
    pub(super) fn attach_existing<W: RootWatcher>(&mut self, watcher: &mut W) {
        for (path, mode) in &self.desired {
            if !path.exists() {
                crate::debug!("watch"; "not yet present: {}", path.display());
                continue;
            }
            match watcher.watch_root(path, *mode) {
                Ok(()) => {
                    self.attached.insert(path.clone());
                }
                Err(e) => crate::log!("watch"; "cannot watch {}: {}", path.display(), e),
            }
        }
    }

    /// Attach roots that appeared since the last pass. Failures are retried
    /// on the next pass.
    pub(super) fn maintain<W: RootWatcher>(&mut self, watcher: &mut W) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for (path, mode) in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }

            if watcher.watch_root(path, *mode).is_ok() {
                self.attached.insert(path.clone());
                crate::debug!("watch"; "attached watch: {}", path.display());
            }
        }
    }

    pub(super) fn attached(&self) -> usize {
        self.attached.len()
    }
}
