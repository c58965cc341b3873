use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Root of the podcast API.  Previews live at `/`, shows at `/id/{id}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Explicit mpv path.  Empty means search beside the executable, then PATH.
    #[serde(default)]
    pub mpv_binary: Option<PathBuf>,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file backing the local key-value store (favorites live here).
    #[serde(default = "default_store_file")]
    pub store_file: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            mpv_binary: None,
            volume: default_volume(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_file: default_store_file(),
        }
    }
}

fn default_base_url() -> String {
    "https://podcast-api.netlify.app".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_volume() -> f32 {
    0.7
}

fn default_store_file() -> PathBuf {
    platform::data_dir().join("storage.json")
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
