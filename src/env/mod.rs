//! Environment variables exposed to the bundler.
//!
//! Every name `X` on the `app.env` allow-list is exposed as `VITE_X`,
//! valued from the ambient `X` (or empty). The bundler snapshots its
//! environment at startup, so any change to the exposed set means the dev
//! server must restart.
//!
//! The exposed set lives in [`EnvSyncState`], owned by whoever drives the
//! bundler. The process environment itself is never mutated; the derived
//! variables are handed to the bundler process explicitly.

use std::collections::BTreeMap;

use crate::config::{ProjectConfig, field};

/// Prefix the bundler requires for client-visible variables.
pub const EXPOSED_PREFIX: &str = "VITE_";

/// Last-seen allow-list and the derived variables it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSyncState {
    last_seen: Vec<String>,
    /// Raw length of the last allow-list, non-string entries included
    last_len: usize,
    exposed: BTreeMap<String, String>,
}

impl EnvSyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every previously exposed variable, then expose the current
    /// allow-list.
    ///
    /// Returns whether anything was removed, which is the signal to restart
    /// a running dev server. A config without an `app.env` array is a no-op.
    pub fn sync<F>(&mut self, config: &ProjectConfig, lookup: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        let (Some(names), Some(entries)) = (config.env_names(), config.array(field::APP_ENV)) else {
            return false;
        };

        // Every previous entry counts as a removal, even one that never
        // produced a variable.
        let changed = self.last_len > 0;
        for name in &self.last_seen {
            self.exposed.remove(&exposed_name(name));
        }

        for name in &names {
            let value = lookup(name).unwrap_or_default();
            self.exposed.insert(exposed_name(name), value);
        }

        crate::debug!("env"; "exposing {} variable(s)", self.exposed.len());
        self.last_seen = names;
        self.last_len = entries.len();
        changed
    }

    /// Derived variables to pass to the bundler process.
    pub fn exposed(&self) -> &BTreeMap<String, String> {
        &self.exposed
    }

    pub fn last_seen(&self) -> &[String] {
        &self.last_seen
    }
}

/// Lookup against the ambient process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn exposed_name(name: &str) -> String {
    format!("{EXPOSED_PREFIX}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(env: serde_json::Value) -> ProjectConfig {
        ProjectConfig::from_value(json!({ "app": { "env": env } }))
    }

    fn lookup(name: &str) -> Option<String> {
        match name {
            "A" => Some("a".into()),
            "B" => Some("b".into()),
            _ => None,
        }
    }

    #[test]
    fn test_first_sync_reports_no_change() {
        let mut state = EnvSyncState::new();
        assert!(!state.sync(&config(json!(["A"])), lookup));
        assert_eq!(state.exposed().get("VITE_A").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_diff_replaces_exposed_set() {
        let mut state = EnvSyncState::new();
        state.sync(&config(json!(["A", "B"])), lookup);

        let changed = state.sync(&config(json!(["B", "C"])), lookup);

        assert!(changed);
        let keys: Vec<_> = state.exposed().keys().cloned().collect();
        assert_eq!(keys, vec!["VITE_B", "VITE_C"]);
        assert_eq!(state.exposed()["VITE_C"], "");
        assert_eq!(state.last_seen(), ["B", "C"]);
    }

    #[test]
    fn test_missing_env_is_noop() {
        let mut state = EnvSyncState::new();
        state.sync(&config(json!(["A"])), lookup);

        assert!(!state.sync(&ProjectConfig::default(), lookup));
        assert!(!state.sync(&config(json!("A")), lookup));
        assert!(state.exposed().contains_key("VITE_A"));
    }

    #[test]
    fn test_same_list_still_reports_change() {
        // Values may have changed in the ambient environment, and the
        // bundler only reads them at startup.
        let mut state = EnvSyncState::new();
        state.sync(&config(json!(["A"])), lookup);
        assert!(state.sync(&config(json!(["A"])), lookup));
    }

    #[test]
    fn test_non_string_entries_still_count_as_removed() {
        let mut state = EnvSyncState::new();
        state.sync(&config(json!([1, null])), lookup);
        assert!(state.exposed().is_empty());

        assert!(state.sync(&config(json!(["A"])), lookup));
        assert_eq!(state.exposed().get("VITE_A").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_empty_list_clears_everything() {
        let mut state = EnvSyncState::new();
        state.sync(&config(json!(["A", "B"])), lookup);

        assert!(state.sync(&config(json!([])), lookup));
        assert!(state.exposed().is_empty());
        assert!(!state.sync(&config(json!([])), lookup));
    }
}
