use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TextSize {
    #[default]
    Normal,
    Large,
    ExtraLarge,
}

impl TextSize {
    pub fn next(self) -> Self {
        match self {
            TextSize::Normal => TextSize::Large,
            TextSize::Large => TextSize::ExtraLarge,
            TextSize::ExtraLarge => TextSize::Normal,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    HighContrast,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::HighContrast,
            Theme::HighContrast => Theme::Dark,
        }
    }
}

/// The voice flags the lesson runner is allowed to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceSettings {
    pub narration: bool,
    pub dictation: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            narration: true,
            dictation: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub voice_narration_enabled: bool,
    pub voice_dictation_enabled: bool,
    pub text_size: TextSize,
    pub theme: Theme,
    /// e.g. `espeak-ng -v pt-br`; the text to read is appended as the last argument
    pub narration_command: Option<String>,
    /// program printing one recognized utterance on stdout
    pub dictation_command: Option<String>,
    pub recommended_track: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            voice_narration_enabled: true,
            voice_dictation_enabled: true,
            text_size: TextSize::default(),
            theme: Theme::default(),
            narration_command: None,
            dictation_command: None,
            recommended_track: None,
        }
    }
}

impl Settings {
    pub fn voice(&self) -> VoiceSettings {
        VoiceSettings {
            narration: self.voice_narration_enabled,
            dictation: self.voice_dictation_enabled,
        }
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::settings_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(path = %self.path.display(), %err, "no settings file, using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring unreadable settings file");
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)
    }
}

/// Settings kept only for the running process
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: std::sync::Mutex<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            saved: std::sync::Mutex::new(Some(initial)),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.saved
            .lock()
            .ok()
            .and_then(|s| s.clone())
            .unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some(settings.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_enable_both_voice_features() {
        let settings = Settings::default();
        assert!(settings.voice_narration_enabled);
        assert!(settings.voice_dictation_enabled);
        assert_eq!(settings.voice(), VoiceSettings::default());
    }

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("settings.json"));
        let settings = Settings::default();
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("settings.json");
        let store = FileSettingsStore::with_path(&path);
        store.save(&Settings::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn flags_are_persisted_under_stable_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileSettingsStore::with_path(&path);
        let settings = Settings {
            voice_narration_enabled: false,
            theme: Theme::HighContrast,
            text_size: TextSize::ExtraLarge,
            ..Settings::default()
        };
        store.save(&settings).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["voiceNarrationEnabled"], serde_json::json!(false));
        assert_eq!(raw["voiceDictationEnabled"], serde_json::json!(true));
        assert_eq!(raw["theme"], serde_json::json!("high-contrast"));
        assert_eq!(raw["textSize"], serde_json::json!("extra-large"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileSettingsStore::with_path(&path).load(), Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, br#"{"voiceDictationEnabled": false}"#).unwrap();
        let settings = FileSettingsStore::with_path(&path).load();
        assert!(!settings.voice_dictation_enabled);
        assert!(settings.voice_narration_enabled);
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn cycling_text_size_and_theme_wraps_around() {
        assert_eq!(TextSize::Normal.next().next().next(), TextSize::Normal);
        assert_eq!(Theme::Dark.next(), Theme::Light);
        assert_eq!(Theme::HighContrast.next(), Theme::Dark);
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let store = MemorySettingsStore::new(Settings::default());
        let settings = Settings {
            recommended_track: Some("mundo-digital".into()),
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }
}
