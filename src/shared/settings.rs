use serde::{Deserialize, Serialize};
use tokio::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use tracing::info;

use super::error::{AppError, AppResult};
use super::types::InitOptions;

/// Environment variable that overrides the stored API key
pub const API_KEY_ENV: &str = "EXPLAIN_POPOVER_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub api_key: String,
}

impl AppSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        ProjectDirs::from("com", "antigravity", "explain-popover")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| AppError::System("Failed to determine config directory".to_string()))
    }

    /// Load settings from the default location, then apply the environment
    /// override
    pub async fn load() -> AppResult<Self> {
        let path = Self::get_settings_path()?;
        let settings = Self::load_from(&path).await?;
        Ok(settings.with_env_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Load settings from `path`, writing defaults there if the file is missing
    pub async fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path).await?;
            info!(path = %path.display(), "wrote default settings");
            return Ok(settings);
        }

        let content = fs::read_to_string(path).await
            .map_err(|e| AppError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| AppError::Parse(format!("Failed to parse settings: {}", e)))
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Io(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;

        fs::write(path, content).await
            .map_err(|e| AppError::Io(format!("Failed to write settings file: {}", e)))
    }

    /// A non-blank override replaces the stored key
    pub fn with_env_override(mut self, value: Option<String>) -> Self {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        self
    }

    pub fn init_options(&self) -> InitOptions {
        InitOptions {
            api_key: self.api_key.clone(),
        }
    }
}
