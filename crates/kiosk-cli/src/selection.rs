use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::settings::kiosk_dir;

/// Remembered user selection, persisted between invocations.
///
/// Best-effort and non-authoritative: a missing or corrupt store never
/// blocks startup, it only loses the remembered defaults.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SelectionStore {
    pub last_language: Option<String>,
    pub last_program: Option<String>,
    /// Last-chosen argument value per program.
    #[serde(default)]
    pub last_args: BTreeMap<String, String>,
}

impl SelectionStore {
    pub fn default_path() -> PathBuf {
        kiosk_dir().join("selection.json")
    }

    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring corrupt selection store: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("cannot create selection store directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    tracing::warn!(path = %path.display(), "cannot persist selection: {e}");
                }
            }
            Err(e) => tracing::warn!("cannot serialize selection: {e}"),
        }
    }

    pub fn remember_arg(&mut self, program: &str, value: &str) {
        self.last_args.insert(program.to_string(), value.to_string());
    }

    pub fn last_arg(&self, program: &str) -> Option<&str> {
        self.last_args.get(program).map(String::as_str)
    }

    /// Delete the persisted store, forgetting all remembered selections.
    pub fn clear(path: &Path) {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(path = %path.display(), "cannot clear selection store: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("selection.json");

        let mut store = SelectionStore {
            last_language: Some("clojure".into()),
            last_program: Some("fact".into()),
            ..Default::default()
        };
        store.remember_arg("fact", "3");
        store.save(&path);

        let loaded = SelectionStore::load(&path);
        assert_eq!(loaded.last_language.as_deref(), Some("clojure"));
        assert_eq!(loaded.last_program.as_deref(), Some("fact"));
        assert_eq!(loaded.last_arg("fact"), Some("3"));
        assert_eq!(loaded.last_arg("fib"), None);
    }

    #[test]
    fn missing_store_is_empty() {
        let loaded = SelectionStore::load(Path::new("/nonexistent/selection.json"));
        assert!(loaded.last_program.is_none());
    }

    #[test]
    fn corrupt_store_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("selection.json");
        std::fs::write(&path, "{{{ not json").unwrap();

        let loaded = SelectionStore::load(&path);
        assert!(loaded.last_language.is_none());
    }

    #[test]
    fn clear_removes_the_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("selection.json");
        SelectionStore::default().save(&path);
        assert!(path.exists());

        SelectionStore::clear(&path);
        assert!(!path.exists());
    }
}
