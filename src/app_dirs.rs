use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn settings_path() -> PathBuf {
        ProjectDirs::from("", "", "trilha")
            .map(|proj_dirs| proj_dirs.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("trilha_settings.json"))
    }

    pub fn log_path() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("trilha")
                .join("trilha.log")
        } else {
            ProjectDirs::from("", "", "trilha")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("trilha.log"))
                .unwrap_or_else(|| PathBuf::from("trilha.log"))
        }
    }
}
