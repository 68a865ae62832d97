use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

pub(super) const DEBOUNCE_MS: u64 = 100;

/// Pure debouncer: timing and per-path dedup only.
pub(super) struct Debouncer {
    /// Path → (kind, arrival order)
    pub(super) changes: FxHashMap<PathBuf, (ChangeKind, u64)>,
    pub(super) last_event: Option<Instant>,
    seq: u64,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            seq: 0,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Remove + Create/Modify → the new kind (file was restored)
    /// - Modify + Remove → Remove
    /// - Create + Remove → nothing happened
    /// - otherwise the first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // Touching index.html/main.js must not feed back into the loop
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            self.add_change(normalize_path(path), kind);
        }
    }

    pub(super) fn add_change(&mut self, path: PathBuf, kind: ChangeKind) {
        self.last_event = Some(Instant::now());

        let Some(&(existing, order)) = self.changes.get(&path) else {
            self.seq += 1;
            self.changes.insert(path, (kind, self.seq));
            return;
        };

        match (existing, kind) {
            (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                self.changes.insert(path, (kind, order));
            }
            (ChangeKind::Modified, ChangeKind::Removed) => {
                self.changes.insert(path, (ChangeKind::Removed, order));
            }
            (ChangeKind::Created, ChangeKind::Removed) => {
                crate::debug!("watch"; "discard created+removed: {}", path.display());
                self.changes.remove(&path);
            }
            _ => {}
        }
    }

    /// Take the batch once the debounce window has passed, in arrival order.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<(PathBuf, ChangeKind)>> {
        let last_event = self.last_event?;
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return None;
        }

        // Window closed: go idle even if everything cancelled out.
        self.last_event = None;
        if self.changes.is_empty() {
            return None;
        }

        let mut changes: Vec<_> = std::mem::take(&mut self.changes).into_iter().collect();
        changes.sort_by_key(|(_, (_, order))| *order);

        Some(
            changes
                .into_iter()
                .map(|(path, (kind, _))| (path, kind))
                .collect(),
        )
    }

    #[cfg(test)]
    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        last_event.elapsed() >= Duration::from_millis(DEBOUNCE_MS) && !self.changes.is_empty()
    }

    /// Sleep until the debounce window closes, or for a long time when idle.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with(".#")
}
