use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::KunyuError;
use crate::models::ResourceKind;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scraper: ScraperConfig,
    pub cache: CacheConfig,
    pub matching: MatchThresholds,
    pub batch: BatchConfig,
}

/// Outbound request settings, handed as-is to the fetch client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub base_url: String,
    /// Permits granted per `per_seconds` window.
    pub max_requests: u32,
    pub per_seconds: u64,
    /// Total per-request timeout (connect + read).
    pub timeout_secs: u64,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Length of the limiter window.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.per_seconds)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl CacheConfig {
    /// Configured database path, or `cache.db` in the platform data dir.
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(AppConfig::default_db_path)
    }
}

/// Minimum similarity score (0-100) a search candidate must exceed to be
/// chosen over the site's own first result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    pub anime_threshold: f64,
    pub character_threshold: f64,
}

impl MatchThresholds {
    pub fn for_kind(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Anime => self.anime_threshold,
            ResourceKind::Character => self.character_threshold,
        }
    }
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            anime_threshold: 60.0,
            character_threshold: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Worker threads used by blocking anime batches.
    pub workers: usize,
}

impl AppConfig {
    /// Load config: user file (if exists), otherwise built-in defaults.
    pub fn load() -> Result<Self, KunyuError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, KunyuError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|e| KunyuError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the limiter and worker pool cannot run with.
    pub fn validate(&self) -> Result<(), KunyuError> {
        if self.scraper.max_requests == 0 {
            return Err(KunyuError::Config("scraper.max_requests must be > 0".into()));
        }
        if self.scraper.per_seconds == 0 {
            return Err(KunyuError::Config("scraper.per_seconds must be > 0".into()));
        }
        if self.batch.workers == 0 {
            return Err(KunyuError::Config("batch.workers must be > 0".into()));
        }
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Default path of the record cache.
    pub fn default_db_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("cache.db"))
            .unwrap_or_else(|| PathBuf::from("cache.db"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "kunyu")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
