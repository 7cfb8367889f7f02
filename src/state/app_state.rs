use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::state::theme::Theme;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings file name inside the platform config directory.
const SETTINGS_FILE: &str = "winestat.json";

/// User settings persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub theme: Theme,
    /// Dataset reopened on start when no path is given on the command line.
    pub last_dataset: Option<PathBuf>,
    /// Show a row with the number of values behind each group's statistics.
    pub show_counts: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            theme: Theme::default(),
            last_dataset: None,
            show_counts: false,
        }
    }

    /// `$XDG_CONFIG_HOME/winestat.json`, falling back to `~/.config`, then
    /// the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .unwrap_or_default()
            .join(SETTINGS_FILE)
    }

    /// Read settings from `path`. A missing or unreadable file yields the
    /// defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<AppState>(&json) {
                Ok(state) => {
                    tracing::info!("Settings loaded from {:?}", path);
                    state
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed settings {:?}: {e}", path);
                    Self::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::new(),
            Err(e) => {
                tracing::warn!("Cannot read settings {:?}: {e}", path);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let state = AppState {
            theme: Theme::Light,
            last_dataset: Some(PathBuf::from("/data/wine.json")),
            show_counts: true,
        };
        state.save(&path).unwrap();
        assert_eq!(AppState::load(&path), state);
    }

    #[test]
    fn missing_or_malformed_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(AppState::load(&dir.path().join("absent.json")), AppState::new());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "[1, 2").unwrap();
        assert_eq!(AppState::load(&bad), AppState::new());
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let state: AppState = serde_json::from_str(r#"{"show_counts": true}"#).unwrap();
        assert!(state.show_counts);
        assert_eq!(state.theme, Theme::default());
        assert_eq!(state.last_dataset, None);
    }
}
