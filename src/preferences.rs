//! Durable user preferences: the API key and the accent color.
//!
//! Stored as a small JSON object under two fixed keys, read once at startup
//! and rewritten synchronously on every change. There is no encryption,
//! expiry, or versioning of the stored shape; unknown or missing values
//! fall back to defaults.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Storage key for the API credential.
pub const API_KEY_KEY: &str = "geminiApiKey";

/// Storage key for the accent color name.
pub const ACCENT_KEY: &str = "dashboardAccentColor";

/// The fixed accent palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccentColor {
    #[default]
    LightGreen,
    SkyBlue,
    Thistle,
    Coral,
}

impl AccentColor {
    pub const ALL: [AccentColor; 4] = [
        AccentColor::LightGreen,
        AccentColor::SkyBlue,
        AccentColor::Thistle,
        AccentColor::Coral,
    ];

    /// Display name, also the stored value.
    pub fn name(self) -> &'static str {
        match self {
            AccentColor::LightGreen => "Light Green",
            AccentColor::SkyBlue => "Sky Blue",
            AccentColor::Thistle => "Thistle",
            AccentColor::Coral => "Coral",
        }
    }

    /// HSL triple as used by the `--accent` CSS variable.
    pub fn hsl(self) -> &'static str {
        match self {
            AccentColor::LightGreen => "120 73% 75%",
            AccentColor::SkyBlue => "197 71% 73%",
            AccentColor::Thistle => "300 24% 80%",
            AccentColor::Coral => "16 100% 70%",
        }
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AccentColor {
    type Err = ReportError;

    /// Accepts the display name, case- and separator-insensitively
    /// (`"Sky Blue"`, `"sky-blue"`, `"skyblue"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        AccentColor::ALL
            .into_iter()
            .find(|a| a.name().replace(' ', "").to_lowercase() == wanted)
            .ok_or_else(|| {
                ReportError::InvalidConfig(format!(
                    "unknown accent color '{s}' (expected one of: {})",
                    AccentColor::ALL.map(|a| a.name()).join(", ")
                ))
            })
    }
}

/// The preferences themselves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserPreferences {
    pub api_key: String,
    pub accent: AccentColor,
}

impl UserPreferences {
    /// The key, or `None` when it is blank.
    pub fn api_key(&self) -> Option<&str> {
        let key = self.api_key.trim();
        (!key.is_empty()).then_some(key)
    }
}

/// On-disk shape. Values are kept verbatim as strings.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(rename = "geminiApiKey", default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(rename = "dashboardAccentColor", default, skip_serializing_if = "Option::is_none")]
    accent: Option<String>,
}

/// JSON-file backed preference storage.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform config directory
    /// (`~/.config/pdf2prod/preferences.json` on Linux).
    pub fn default_location() -> Result<Self, ReportError> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ReportError::Internal("could not determine the user config directory".into())
        })?;
        Ok(Self::at(dir.join("pdf2prod").join("preferences.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored preferences. A missing file yields defaults; an
    /// unknown accent name yields the default accent.
    pub fn load(&self) -> Result<UserPreferences, ReportError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences at {}, using defaults", self.path.display());
                return Ok(UserPreferences::default());
            }
            Err(e) => return Err(self.failed(e)),
        };

        let stored: StoredPreferences = serde_json::from_str(&text).map_err(|e| self.failed(e))?;

        let accent = match stored.accent.as_deref() {
            None => AccentColor::default(),
            Some(name) => AccentColor::ALL
                .into_iter()
                .find(|a| a.name() == name)
                .unwrap_or_else(|| {
                    warn!("Unknown stored accent '{}', using default", name);
                    AccentColor::default()
                }),
        };

        Ok(UserPreferences {
            api_key: stored.api_key.unwrap_or_default(),
            accent,
        })
    }

    /// Write all preferences.
    pub fn save(&self, prefs: &UserPreferences) -> Result<(), ReportError> {
        let stored = StoredPreferences {
            api_key: Some(prefs.api_key.clone()),
            accent: Some(prefs.accent.name().to_string()),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(|e| self.failed(e))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.failed(e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| self.failed(e))?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }

    fn failed(&self, e: impl fmt::Display) -> ReportError {
        ReportError::PreferencesFailed {
            path: self.path.clone(),
            detail: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::at(dir.path().join("prefs.json"));
        let prefs = store.load().unwrap();
        assert_eq!(prefs, UserPreferences::default());
        assert!(prefs.api_key().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::at(dir.path().join("nested").join("prefs.json"));
        let prefs = UserPreferences {
            api_key: "AIza-test".into(),
            accent: AccentColor::Coral,
        };
        store.save(&prefs).unwrap();
        assert_eq!(store.load().unwrap(), prefs);
    }

    #[test]
    fn uses_fixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::at(dir.path().join("prefs.json"));
        store
            .save(&UserPreferences {
                api_key: "k".into(),
                accent: AccentColor::SkyBlue,
            })
            .unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[API_KEY_KEY], "k");
        assert_eq!(raw[ACCENT_KEY], "Sky Blue");
    }

    #[test]
    fn unknown_accent_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"dashboardAccentColor": "Neon"}"#).unwrap();
        let prefs = PreferenceStore::at(path).load().unwrap();
        assert_eq!(prefs.accent, AccentColor::LightGreen);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        let err = PreferenceStore::at(path).load().unwrap_err();
        assert!(matches!(err, ReportError::PreferencesFailed { .. }));
    }

    #[test]
    fn accent_from_str() {
        assert_eq!("Sky Blue".parse::<AccentColor>().unwrap(), AccentColor::SkyBlue);
        assert_eq!("sky-blue".parse::<AccentColor>().unwrap(), AccentColor::SkyBlue);
        assert_eq!("CORAL".parse::<AccentColor>().unwrap(), AccentColor::Coral);
        assert!("mauve".parse::<AccentColor>().is_err());
        assert_eq!(AccentColor::Thistle.hsl(), "300 24% 80%");
    }
}
