//! Gateway settings persistence.
//!
//! Stored in `~/.config/agropulse/settings.json` (macOS:
//! `~/Library/Application Support/agropulse/settings.json`).
//! Env vars override the file; a missing or invalid file means defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::llm::provider::ModelTier;

const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_FAST_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_REASONING_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub base_url: String,
    pub fast_model: String,
    pub reasoning_model: String,
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            temperature: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Directory where settings are stored.
fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agropulse")
}

pub fn settings_path() -> PathBuf {
    config_dir().join(SETTINGS_FILE)
}

impl Settings {
    /// File settings with env overrides applied.
    pub fn load() -> Self {
        let mut settings = Self::load_from(&settings_path());
        settings.apply_env();
        settings
    }

    /// Load from a specific file. Returns defaults if it doesn't exist or is invalid.
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("[CONFIG] Ignoring invalid {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&settings_path())
    }

    /// Persist to a specific file, creating its directory if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config dir: {}", e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        log::info!("[CONFIG] Saved settings to {}", path.display());
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(model) = std::env::var("GEMINI_FAST_MODEL") {
            if !model.is_empty() {
                self.fast_model = model;
            }
        }
        if let Ok(model) = std::env::var("GEMINI_REASONING_MODEL") {
            if !model.is_empty() {
                self.reasoning_model = model;
            }
        }
        if let Ok(secs) = std::env::var("GEMINI_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(n) => self.timeout_secs = n,
                Err(_) => log::warn!("[CONFIG] GEMINI_TIMEOUT_SECS is not a number: {}", secs),
            }
        }
    }

    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Reasoning => &self.reasoning_model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let settings = Settings::load_from(std::path::Path::new("/nonexistent/agropulse.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = std::env::temp_dir().join("agropulse-test-partial-settings.json");
        std::fs::write(&path, r#"{ "fastModel": "gemini-2.0-flash" }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.model_for(ModelTier::Fast), "gemini-2.0-flash");
        assert_eq!(settings.model_for(ModelTier::Reasoning), DEFAULT_REASONING_MODEL);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("agropulse-test-settings-roundtrip");
        let path = dir.join(SETTINGS_FILE);
        let settings = Settings {
            temperature: Some(0.2),
            timeout_secs: 15,
            ..Settings::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
