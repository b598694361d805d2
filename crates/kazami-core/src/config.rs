use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::KazamiError;
use crate::feed::FeedCategory;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub feeds: FeedsConfig,
    pub filters: FiltersConfig,
    pub archive: ArchiveConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    #[serde(default)]
    pub link_sources: Vec<String>,
    #[serde(default)]
    pub text_sources: Vec<String>,
    #[serde(default)]
    pub time_sources: Vec<String>,
    pub check_interval: u64,
    pub auto_check: bool,
}

impl FeedsConfig {
    /// Sources configured for a category.
    pub fn sources(&self, category: FeedCategory) -> &[String] {
        match category {
            FeedCategory::Link => &self.link_sources,
            FeedCategory::Text => &self.text_sources,
            FeedCategory::Time => &self.time_sources,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub enabled: bool,
    pub use_presets: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    pub open_links: bool,
}

impl AppConfig {
    /// Load the user file if it exists, otherwise the built-in defaults.
    pub fn load() -> Result<Self, KazamiError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            let content = std::fs::read_to_string(&user_path)?;
            toml::from_str(&content).map_err(|e| KazamiError::Config(e.to_string()))
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| KazamiError::Config(e.to_string()))
        }
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), KazamiError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| KazamiError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the ordered filter list.
    pub fn filters_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("filters.toml"))
            .unwrap_or_else(|| PathBuf::from("filters.toml"))
    }

    /// Path to the user's library snapshot consulted by filter conditions.
    pub fn library_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("library.toml"))
            .unwrap_or_else(|| PathBuf::from("library.toml"))
    }

    /// Path to the download archive database.
    pub fn archive_path() -> PathBuf {
        Self::data_dir().join("archive.db")
    }

    /// Directory for rolling log files.
    pub fn log_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Ensure the data directory exists and return it.
    pub fn ensure_data_dir() -> Result<PathBuf, KazamiError> {
        let dir = Self::data_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "kazami")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert_eq!(config.feeds.check_interval, 60);
        assert!(config.feeds.auto_check);
        assert_eq!(config.feeds.link_sources.len(), 1);
        assert!(config.filters.use_presets);
        assert!(config.archive.enabled);
    }

    #[test]
    fn test_sources_by_category() {
        let config = AppConfig::default();
        assert_eq!(config.feeds.sources(FeedCategory::Link).len(), 1);
        assert!(config.feeds.sources(FeedCategory::Time).is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.feeds.link_sources, config.feeds.link_sources);
    }
}
