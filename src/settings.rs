use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReceivablesError, Result};
use crate::theme::Theme;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("receivables")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("receivables.log")
}

/// Missing or unreadable files load as defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => Settings::default(),
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ReceivablesError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            theme: Some(Theme::Dark),
        };
        save_settings_to(&path, &settings).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"theme\": \"dark\""));
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(s.theme, None);
    }

    #[test]
    fn test_load_ignores_unknown_keys_and_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"theme": "light", "data_dir": "/tmp"}"#).unwrap();
        assert_eq!(load_settings_from(&path).theme, Some(Theme::Light));
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        save_settings_to(&path, &Settings::default()).unwrap();
        assert!(path.exists());
    }
}
