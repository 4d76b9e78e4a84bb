use crate::session::{DEFAULT_CHAT_PATH, RECONNECT_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Assistant server `host[:port]`.
    #[serde(default = "default_host")]
    pub host: String,
    /// Use `wss://` instead of `ws://`.
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Output device name; empty means the system default.
    #[serde(default)]
    pub output_device: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub start_in_text_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            secure: false,
            path: default_path(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            output_device: String::new(),
            theme: default_theme(),
            start_in_text_mode: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1:8000".into()
}
fn default_path() -> String {
    DEFAULT_CHAT_PATH.into()
}
fn default_reconnect_delay_ms() -> u64 {
    RECONNECT_DELAY_MS
}
fn default_theme() -> String {
    "dark".into()
}

pub fn settings_path() -> Result<PathBuf, String> {
    if let Some(dir) = dirs::data_local_dir() {
        return Ok(dir.join("Jarvis").join("settings.json"));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".jarvis").join("settings.json"));
    }
    Err("Failed to resolve data directory".into())
}

pub fn load() -> Settings {
    match settings_path() {
        Ok(path) => load_from(&path),
        Err(_) => Settings::default(),
    }
}

pub fn load_from(path: &Path) -> Settings {
    let mut settings: Settings = match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            log::warn!("[settings] ignoring unreadable {}: {}", path.display(), e);
            Settings::default()
        }),
        Err(_) => return Settings::default(),
    };
    // A zero delay would spin on a dead server.
    if settings.reconnect_delay_ms == 0 {
        settings.reconnect_delay_ms = RECONNECT_DELAY_MS;
    }
    settings
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create settings dir: {}", e))?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {}", e))?;
    fs::write(path, json).map_err(|e| format!("Failed to write settings: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_from(&dir.path().join("absent.json"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.reconnect_delay_ms, 3000);
        assert_eq!(settings.path, "/ws/chat");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"host":"10.0.0.2:9000","secure":true}"#).unwrap();

        let settings = load_from(&path);
        assert_eq!(settings.host, "10.0.0.2:9000");
        assert!(settings.secure);
        assert_eq!(settings.theme, "dark");
        assert!(!settings.start_in_text_mode);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ nope").unwrap();
        assert_eq!(load_from(&path), Settings::default());
    }

    #[test]
    fn zero_delay_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"reconnect_delay_ms":0}"#).unwrap();
        assert_eq!(load_from(&path).reconnect_delay_ms, RECONNECT_DELAY_MS);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            host: "assistant.local".into(),
            output_device: "Speakers".into(),
            start_in_text_mode: true,
            ..Settings::default()
        };
        save_to(&path, &settings).unwrap();
        assert_eq!(load_from(&path), settings);
    }
}
