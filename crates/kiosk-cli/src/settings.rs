use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// CLI settings, read from `~/.kiosk/config.toml` when present.
#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default = "default_assets_root")]
    pub assets_root: String,
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_assets_root() -> String {
    "http://localhost:8000/demo-assets".into()
}

fn default_language() -> String {
    "clojure".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            default_language: default_language(),
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read settings file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("cannot parse settings file {}", path.display()))
    }

    /// Load settings: an explicit path must parse; the default path is
    /// used only if it exists; otherwise built-in defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let default = Self::default_path();
        if default.exists() {
            return Self::from_file(&default);
        }
        Ok(Self::default())
    }

    pub fn default_path() -> PathBuf {
        kiosk_dir().join("config.toml")
    }
}

/// Base directory for CLI state: `~/.kiosk/`.
pub fn kiosk_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kiosk")
}
